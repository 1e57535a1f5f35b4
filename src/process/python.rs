//! Python interpreter process bootstrap and I/O glue.

use std::path::PathBuf;

use super::protocol::{opt_str, Request};
use super::ProcessHandle;
use crate::engine::{CapturedStreams, Engine, EngineError, Loader};

/// Worker program run by the interpreter; speaks the NDJSON protocol.
const WORKER: &str = include_str!("worker.py");

const CANDIDATES: &[&str] = &["python3", "python"];

/// Resolve the interpreter executable: an explicit path/name, or the first
/// candidate found on PATH.
pub fn resolve_interpreter(explicit: Option<&str>) -> Result<PathBuf, EngineError> {
    match explicit {
        Some(exe) => which::which(exe)
            .map_err(|e| EngineError::NotFound(format!("{exe} not found: {e}"))),
        None => CANDIDATES
            .iter()
            .find_map(|c| which::which(c).ok())
            .ok_or_else(|| {
                EngineError::NotFound(format!("no Python interpreter found in PATH (tried {})", CANDIDATES.join(", ")))
            }),
    }
}

/// Starts a CPython child running the embedded worker.
#[derive(Default)]
pub struct PythonLoader {
    executable: Option<String>,
    handle: Option<ProcessHandle>,
}

impl PythonLoader {
    pub fn new(executable: Option<String>) -> Self {
        Self {
            executable,
            handle: None,
        }
    }
}

impl Loader for PythonLoader {
    type Engine = PythonEngine;

    async fn fetch(&mut self) -> Result<(), EngineError> {
        let program = resolve_interpreter(self.executable.as_deref())?;
        tracing::info!(program = %program.display(), "starting interpreter");
        self.handle = Some(ProcessHandle::spawn(&program, &["-u", "-c", WORKER])?);
        Ok(())
    }

    async fn initialize(&mut self) -> Result<(PythonEngine, String), EngineError> {
        let mut handle = self.handle.take().ok_or(EngineError::Closed)?;
        let fields = handle.request(&Request::Init).await?;
        let version = opt_str(&fields, "version").unwrap_or_else(|| "unknown".into());
        Ok((PythonEngine { handle }, version))
    }
}

/// Ready interpreter handle.
pub struct PythonEngine {
    handle: ProcessHandle,
}

impl PythonEngine {
    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

impl Engine for PythonEngine {
    async fn load_packages(&mut self, names: &[String]) -> Result<(), EngineError> {
        self.handle.request(&Request::LoadPackages { names }).await?;
        Ok(())
    }

    async fn load_installer(&mut self) -> Result<(), EngineError> {
        self.handle.request(&Request::LoadInstaller).await?;
        Ok(())
    }

    async fn install(&mut self, name: &str) -> Result<(), EngineError> {
        self.handle.request(&Request::Install { name }).await?;
        Ok(())
    }

    async fn verify_import(&mut self, module: &str) -> Result<String, EngineError> {
        let fields = self.handle.request(&Request::Verify { name: module }).await?;
        Ok(opt_str(&fields, "version").unwrap_or_else(|| "unknown".into()))
    }

    async fn redirect_streams(&mut self) -> Result<(), EngineError> {
        self.handle.request(&Request::Redirect).await?;
        Ok(())
    }

    async fn run(&mut self, source: &str) -> Result<Option<String>, EngineError> {
        let fields = self.handle.request(&Request::Run { code: source }).await?;
        Ok(opt_str(&fields, "value"))
    }

    async fn read_capture(&mut self) -> Result<CapturedStreams, EngineError> {
        let fields = self.handle.request(&Request::ReadCapture).await?;
        serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| EngineError::Protocol(e.to_string()))
    }

    async fn restore_streams(&mut self) -> Result<(), EngineError> {
        self.handle.request(&Request::Restore).await?;
        Ok(())
    }
}
