//! TUI application state management.

use crate::bootstrap::LoadProgress;

use super::editor::Editor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Bootstrap in progress, or failed (the status line then starts with `Error:`).
    Loading,
    Ready,
}

/// Application state for the playground.
#[derive(Debug)]
pub struct App {
    pub phase: Phase,
    pub progress: LoadProgress,
    pub editor: Editor,
    /// Latest formatted run result
    pub result: String,
    /// Whether a run is in flight
    pub running: bool,
    pub status_message: String,
    pub version: Option<String>,
    pub show_help: bool,
    pub result_scroll: u16,
}

impl App {
    pub fn new(snippet: &str) -> Self {
        Self {
            phase: Phase::Loading,
            progress: LoadProgress::default(),
            editor: Editor::with_text(snippet),
            result: String::new(),
            running: false,
            status_message: String::new(),
            version: None,
            show_help: false,
            result_scroll: 0,
        }
    }

    pub fn update_progress(&mut self, progress: LoadProgress) {
        self.progress = progress;
    }

    pub fn boot_failed(&self) -> bool {
        self.phase == Phase::Loading && self.progress.status.starts_with("Error:")
    }

    pub fn set_ready(&mut self, version: String, skipped: &[String], warning: Option<String>) {
        self.phase = Phase::Ready;
        self.status_message = match (skipped.is_empty(), warning) {
            (_, Some(w)) => w,
            (false, None) => format!("Python {version} | skipped: {} | F5 run, F1 help", skipped.join(", ")),
            (true, None) => format!("Python {version} | F5 run, F1 help"),
        };
        self.version = Some(version);
    }

    /// Mark a run as started. Returns false if one is already in flight.
    pub fn begin_run(&mut self) -> bool {
        if self.running {
            self.status_message = "Still running the previous snippet...".into();
            return false;
        }
        self.running = true;
        self.status_message = "Running...".into();
        true
    }

    pub fn finish_run(&mut self, result: String) {
        self.running = false;
        self.result = result;
        self.result_scroll = 0;
        self.status_message = match &self.version {
            Some(v) => format!("Python {v} | F5 run, F1 help"),
            None => "F5 run, F1 help".into(),
        };
    }

    pub fn clear_result(&mut self) {
        self.result.clear();
        self.result_scroll = 0;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn scroll_result_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    pub fn scroll_result_down(&mut self) {
        let max = self.result.lines().count().saturating_sub(1) as u16;
        if self.result_scroll < max {
            self.result_scroll += 1;
        }
    }
}
