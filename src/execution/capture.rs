//! Scoped stdout/stderr capture around one evaluation.

use crate::engine::{CapturedStreams, Engine, EngineError};

/// Engine plus a marker recording whether a capture scope is still open.
///
/// The marker survives a cancelled run (the future dropped between redirect
/// and restore), so the next scope restores the streams before opening again.
pub struct StreamCapture<E: Engine> {
    engine: E,
    open: bool,
}

impl<E: Engine> StreamCapture<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, open: false }
    }

    pub fn into_inner(self) -> E {
        self.engine
    }

    /// Redirect the streams, evaluate `source`, read the buffers back, and
    /// restore the streams whatever happened in between.
    ///
    /// An evaluation error takes precedence over a restore error.
    pub async fn scope(&mut self, source: &str) -> Result<(Option<String>, CapturedStreams), EngineError> {
        if self.open {
            tracing::warn!("previous capture scope was interrupted; restoring streams");
            self.engine.restore_streams().await?;
            self.open = false;
        }

        self.open = true;
        let outcome = match self.engine.redirect_streams().await {
            Ok(()) => self.evaluate(source).await,
            Err(e) => Err(e),
        };

        let restored = self.engine.restore_streams().await;
        match &restored {
            Ok(()) => self.open = false,
            Err(e) => tracing::error!("failed to restore interpreter streams: {e}"),
        }

        let outcome = outcome?;
        restored?;
        Ok(outcome)
    }

    async fn evaluate(&mut self, source: &str) -> Result<(Option<String>, CapturedStreams), EngineError> {
        let value = self.engine.run(source).await?;
        let streams = self.engine.read_capture().await?;
        Ok((value, streams))
    }
}
