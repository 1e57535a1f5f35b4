//! Interpreter process management (startup/IO/health).

use std::path::Path;
use std::process::Stdio;

use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::engine::EngineError;

pub mod protocol;
pub mod python;

use protocol::{Request, Response};

/// A running interpreter child speaking the NDJSON protocol on stdin/stdout.
///
/// Every request carries an id. A request whose future was dropped still gets
/// answered by the worker; that frame is skipped by the next request.
pub struct ProcessHandle {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr_task: JoinHandle<()>,
    next_id: u64,
    /// A write was interrupted mid-line.
    torn: bool,
}

impl ProcessHandle {
    pub fn spawn(program: &Path, args: &[&str]) -> Result<Self, EngineError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("no stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("no stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Protocol("no stderr".into()))?;

        // Drain stderr so the worker can never block on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "pyrun::worker", "{line}");
            }
        });

        tracing::debug!(program = %program.display(), pid = ?child.id(), "interpreter spawned");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            stderr_task,
            next_id: 0,
            torn: false,
        })
    }

    /// Send one request and wait for its response frame.
    pub async fn request(&mut self, req: &Request<'_>) -> Result<Map<String, Value>, EngineError> {
        let id = self.next_id;
        self.next_id += 1;
        let line = req.to_line(id)?;

        if self.torn {
            // Terminate the partial line; the worker answers it with an untagged frame.
            self.stdin.write_all(b"\n").await?;
            self.torn = false;
        }
        self.torn = true;
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        self.torn = false;

        read_response(&mut self.stdout, id).await
    }

    /// Ask the worker to exit, then reap it.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.request(&Request::Shutdown).await {
            tracing::debug!("shutdown request failed: {e}");
        }
        drop(self.stdin);
        match self.child.wait().await {
            Ok(status) => tracing::debug!(%status, "interpreter exited"),
            Err(e) => tracing::warn!("failed to reap interpreter: {e}"),
        }
        let _ = self.stderr_task.await;
    }
}

/// Read frames until the one answering `id`, discarding answers to requests
/// that were abandoned earlier.
async fn read_response<R>(lines: &mut Lines<R>, id: u64) -> Result<Map<String, Value>, EngineError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let Some(frame) = lines.next_line().await? else {
            return Err(EngineError::Closed);
        };
        let resp = Response::parse(&frame)?;
        if resp.id == Some(id) {
            return resp.into_result();
        }
        tracing::debug!(expected = id, got = ?resp.id, "discarding stale frame");
    }
}
