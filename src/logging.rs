//! Tracing setup. Logs go to a file so the terminal UI is never corrupted.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_tracing(log_path: &Path) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut warning = None;
    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warning = Some(format!("Failed to create log dir {}: {e}", parent.display()));
        }
    }

    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %log_path.display(), "Logging initialized");
            if let Some(w) = warning {
                tracing::warn!("{w}");
            }
        }
        // Prefer no logs over writing into the terminal.
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}
