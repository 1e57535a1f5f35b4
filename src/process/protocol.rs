//! NDJSON frames exchanged with the worker script.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::EngineError;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request<'a> {
    Init,
    LoadPackages { names: &'a [String] },
    LoadInstaller,
    Install { name: &'a str },
    Verify { name: &'a str },
    Redirect,
    Run { code: &'a str },
    ReadCapture,
    Restore,
    Shutdown,
}

/// A request on the wire: the op fields plus the id echoed in its response.
#[derive(Serialize)]
struct Envelope<'r, 'a> {
    id: u64,
    #[serde(flatten)]
    request: &'r Request<'a>,
}

impl Request<'_> {
    pub fn to_line(&self, id: u64) -> Result<String, EngineError> {
        let envelope = Envelope { id, request: self };
        let mut line =
            serde_json::to_string(&envelope).map_err(|e| EngineError::Protocol(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }
}

#[derive(Debug, Deserialize)]
pub struct Response {
    /// Id of the request this answers; `None` when the worker could not parse it.
    #[serde(default)]
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Response {
    pub fn parse(line: &str) -> Result<Self, EngineError> {
        serde_json::from_str(line.trim_end())
            .map_err(|e| EngineError::Protocol(format!("{e}: {}", line.trim_end())))
    }

    /// Payload fields on success; a failed frame becomes [`EngineError::Raised`].
    pub fn into_result(self) -> Result<Map<String, Value>, EngineError> {
        if self.ok {
            Ok(self.fields)
        } else {
            Err(EngineError::Raised(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// Optional string field; JSON `null` and absence both map to `None`.
pub fn opt_str(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}
