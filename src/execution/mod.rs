//! Execution session: runs snippets against a ready engine and formats what
//! they produced.

use std::fmt;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::engine::{Engine, EngineError};

pub mod capture;

use capture::StreamCapture;

pub const NO_OUTPUT: &str = "Code executed successfully (no output)";

/// Artifacts of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionResult {
    pub stdout: String,
    pub stderr: String,
    /// String form of the final expression; `None` for statements and `None` values.
    pub return_value: Option<String>,
}

/// One titled block of a rendered [`SessionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Output,
    Errors,
    ReturnValue,
}

impl Section {
    pub fn heading(self) -> &'static str {
        match self {
            Section::Output => "Output:",
            Section::Errors => "Errors:",
            Section::ReturnValue => "Return value:",
        }
    }

    /// Stream sections end with a blank separator; the return value is last.
    pub fn terminator(self) -> &'static str {
        match self {
            Section::ReturnValue => "",
            _ => "\n",
        }
    }
}

impl SessionResult {
    pub fn is_empty(&self) -> bool {
        self.sections().next().is_none()
    }

    /// Sections worth showing, in display order. Whitespace-only streams are skipped.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &str)> {
        let stdout = Some(self.stdout.as_str()).filter(|s| !s.trim().is_empty());
        let stderr = Some(self.stderr.as_str()).filter(|s| !s.trim().is_empty());
        [
            stdout.map(|s| (Section::Output, s)),
            stderr.map(|s| (Section::Errors, s)),
            self.return_value.as_deref().map(|v| (Section::ReturnValue, v)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Combined display string: `Output`, `Errors` and `Return value` sections,
/// or a fixed message when there is nothing to show.
impl fmt::Display for SessionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(NO_OUTPUT);
        }
        for (section, body) in self.sections() {
            write!(f, "{}\n{body}{}", section.heading(), section.terminator())?;
        }
        Ok(())
    }
}

/// Display string for a failed run.
pub fn error_display(err: &EngineError) -> String {
    format!("Error: {err}")
}

/// Owns the runtime handle. Runs are serialized: a second caller waits until
/// the first one has restored the streams.
pub struct ExecutionSession<E: Engine> {
    inner: Mutex<StreamCapture<E>>,
}

impl<E: Engine> ExecutionSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(StreamCapture::new(engine)),
        }
    }

    /// True while a run holds the engine.
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    pub async fn run(&self, source: &str) -> Result<SessionResult, EngineError> {
        let mut capture = self.inner.lock().await;
        let started = Instant::now();
        tracing::debug!(bytes = source.len(), "running snippet");

        let result = capture.scope(source).await;
        match &result {
            Ok(_) => tracing::debug!(elapsed = ?started.elapsed(), "snippet finished"),
            Err(e) => tracing::debug!(elapsed = ?started.elapsed(), "snippet failed: {e}"),
        }

        let (return_value, streams) = result?;
        Ok(SessionResult {
            stdout: streams.stdout,
            stderr: streams.stderr,
            return_value,
        })
    }

    /// Run and render; failures become a single `Error: <message>` string.
    pub async fn run_display(&self, source: &str) -> String {
        match self.run(source).await {
            Ok(result) => result.to_string(),
            Err(e) => error_display(&e),
        }
    }

    pub fn into_engine(self) -> E {
        self.inner.into_inner().into_inner()
    }
}
