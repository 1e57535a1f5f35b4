//! Custom event types for the playground.

use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::bootstrap::LoadProgress;
use crate::execution::ExecutionSession;
use crate::process::python::PythonEngine;

/// Events that can occur in the TUI application
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// Bootstrap progress update
    Progress(LoadProgress),
    /// Bootstrap finished and the session is usable
    Ready {
        session: Arc<ExecutionSession<PythonEngine>>,
        version: String,
        skipped: Vec<String>,
        warning: Option<String>,
    },
    /// Formatted result of a finished run
    RunFinished(String),
}
