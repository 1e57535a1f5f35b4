//! Scripted in-memory engine for unit tests.
//!
//! Source is read line by line: `print:<text>` writes a line to stdout,
//! `warn:<text>` to stderr, `raise:<msg>` raises, and `value:<v>` sets the
//! final expression value.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{CapturedStreams, Engine, EngineError, Loader};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub calls: Vec<String>,
    pub redirected: bool,
    pub stdout: String,
    pub stderr: String,
    /// Writes made while no capture scope was open.
    pub console: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeEngine {
    pub state: Arc<Mutex<FakeState>>,
    pub broken: HashSet<String>,
    pub installer_broken: bool,
    pub run_delay: Option<Duration>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broken(mut self, names: &[&str]) -> Self {
        self.broken.extend(names.iter().map(|s| s.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn is_redirected(&self) -> bool {
        self.state.lock().unwrap().redirected
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().unwrap().calls.push(call.into());
    }
}

impl Engine for FakeEngine {
    async fn load_packages(&mut self, names: &[String]) -> Result<(), EngineError> {
        self.record(format!("load_packages:{}", names.join(",")));
        let missing: Vec<&str> = names
            .iter()
            .filter(|n| self.broken.contains(*n))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Raised(format!("No known package with name '{}'", missing.join(", "))))
        }
    }

    async fn load_installer(&mut self) -> Result<(), EngineError> {
        self.record("load_installer");
        if self.installer_broken {
            return Err(EngineError::Raised("No module named 'pip'".into()));
        }
        Ok(())
    }

    async fn install(&mut self, name: &str) -> Result<(), EngineError> {
        self.record(format!("install:{name}"));
        if self.broken.contains(name) {
            return Err(EngineError::Raised(format!(
                "Can't find a pure Python 3 wheel for '{name}'"
            )));
        }
        Ok(())
    }

    async fn verify_import(&mut self, module: &str) -> Result<String, EngineError> {
        self.record(format!("verify:{module}"));
        if self.broken.contains(module) {
            return Err(EngineError::Raised(format!("No module named '{module}'")));
        }
        Ok("1.0".into())
    }

    async fn redirect_streams(&mut self) -> Result<(), EngineError> {
        self.record("redirect");
        let mut st = self.state.lock().unwrap();
        st.redirected = true;
        st.stdout.clear();
        st.stderr.clear();
        Ok(())
    }

    async fn run(&mut self, source: &str) -> Result<Option<String>, EngineError> {
        self.record("run");
        if let Some(delay) = self.run_delay {
            tokio::time::sleep(delay).await;
        }
        let mut value = None;
        for line in source.lines() {
            let mut st = self.state.lock().unwrap();
            if let Some(text) = line.strip_prefix("print:") {
                let target = if st.redirected { &mut st.stdout } else { &mut st.console };
                target.push_str(text);
                target.push('\n');
            } else if let Some(text) = line.strip_prefix("warn:") {
                let target = if st.redirected { &mut st.stderr } else { &mut st.console };
                target.push_str(text);
                target.push('\n');
            } else if let Some(msg) = line.strip_prefix("raise:") {
                return Err(EngineError::Raised(msg.to_string()));
            } else if let Some(v) = line.strip_prefix("value:") {
                value = Some(v.to_string());
            }
        }
        Ok(value)
    }

    async fn read_capture(&mut self) -> Result<CapturedStreams, EngineError> {
        self.record("read_capture");
        let st = self.state.lock().unwrap();
        Ok(CapturedStreams {
            stdout: st.stdout.clone(),
            stderr: st.stderr.clone(),
        })
    }

    async fn restore_streams(&mut self) -> Result<(), EngineError> {
        self.record("restore");
        self.state.lock().unwrap().redirected = false;
        Ok(())
    }
}

/// Loader that hands out a prepared [`FakeEngine`].
#[derive(Debug, Default)]
pub(crate) struct FakeLoader {
    pub engine: Option<FakeEngine>,
    pub fetch_fails: bool,
    pub init_fails: bool,
}

impl FakeLoader {
    pub fn new(engine: FakeEngine) -> Self {
        Self {
            engine: Some(engine),
            ..Self::default()
        }
    }
}

impl Loader for FakeLoader {
    type Engine = FakeEngine;

    async fn fetch(&mut self) -> Result<(), EngineError> {
        if self.fetch_fails {
            return Err(EngineError::NotFound("python3 not found in PATH".into()));
        }
        Ok(())
    }

    async fn initialize(&mut self) -> Result<(FakeEngine, String), EngineError> {
        if self.init_fails {
            return Err(EngineError::Closed);
        }
        let engine = self.engine.take().ok_or(EngineError::Closed)?;
        Ok((engine, "3.12.0 (fake)".into()))
    }
}
