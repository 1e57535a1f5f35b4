//! Embedded engine API surface: loader, package management, evaluation and
//! process-wide stream redirection.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Interpreter executable could not be located.
    #[error("{0}")]
    NotFound(String),
    #[error("I/O error talking to the interpreter: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame from interpreter: {0}")]
    Protocol(String),
    #[error("interpreter exited")]
    Closed,
    /// Exception raised inside the interpreter; displays as the bare message.
    #[error("{0}")]
    Raised(String),
}

/// Text read back from one capture scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CapturedStreams {
    pub stdout: String,
    pub stderr: String,
}

/// Brings an engine up: fetch its loader, then initialize a handle.
pub trait Loader {
    type Engine: Engine;

    fn fetch(&mut self) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Returns the handle and a human-readable engine version.
    fn initialize(
        &mut self,
    ) -> impl Future<Output = Result<(Self::Engine, String), EngineError>> + Send;
}

/// Operations the bootstrapper and execution session need from a ready engine.
pub trait Engine: Send + 'static {
    /// Load a batch of packages; fails if any of them is unavailable.
    fn load_packages(
        &mut self,
        names: &[String],
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    fn load_installer(&mut self) -> impl Future<Output = Result<(), EngineError>> + Send;

    fn install(&mut self, name: &str) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Import `module` and return its reported version.
    fn verify_import(
        &mut self,
        module: &str,
    ) -> impl Future<Output = Result<String, EngineError>> + Send;

    /// Substitute fresh capture buffers for stdout/stderr.
    fn redirect_streams(&mut self) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Evaluate `source`; yields the final expression's value unless it is `None`.
    fn run(
        &mut self,
        source: &str,
    ) -> impl Future<Output = Result<Option<String>, EngineError>> + Send;

    fn read_capture(&mut self) -> impl Future<Output = Result<CapturedStreams, EngineError>> + Send;

    fn restore_streams(&mut self) -> impl Future<Output = Result<(), EngineError>> + Send;
}
