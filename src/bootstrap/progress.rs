//! Load progress published over a `watch` channel.

use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadProgress {
    /// 0..=100, never decreases.
    pub percent: u8,
    pub status: String,
}

impl LoadProgress {
    pub fn is_ready(&self) -> bool {
        self.percent == 100
    }
}

/// Write side of the progress channel. Percent only moves forward and is
/// frozen once [`ProgressReporter::ready`] has been called.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<LoadProgress>,
}

impl ProgressReporter {
    pub fn new() -> (Self, watch::Receiver<LoadProgress>) {
        let (tx, rx) = watch::channel(LoadProgress::default());
        (Self { tx }, rx)
    }

    /// Replace the status text. Ignored once ready.
    pub fn status(&self, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_if_modified(|p| {
            if p.is_ready() {
                return false;
            }
            p.status = status;
            true
        });
    }

    /// Move to `percent` (clamped below 100) and set a new status. Ignored once ready.
    pub fn advance(&self, percent: u8, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_if_modified(|p| {
            if p.is_ready() {
                return false;
            }
            p.percent = p.percent.max(percent.min(99));
            p.status = status;
            true
        });
    }

    pub fn advance_to(&self, percent: u8) {
        self.tx.send_if_modified(|p| {
            let next = p.percent.max(percent.min(99));
            if p.is_ready() || next == p.percent {
                return false;
            }
            p.percent = next;
            true
        });
    }

    pub fn ready(&self, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|p| {
            p.percent = 100;
            p.status = status;
        });
    }

    pub fn current(&self) -> LoadProgress {
        self.tx.borrow().clone()
    }
}
