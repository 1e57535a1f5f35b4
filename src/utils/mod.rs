//! Utilities (source file loading, unicode helpers).

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};

pub mod unicode;

/// Read a Python source file for one-shot runs.
/// Accepts `.py`, `.txt` and files without extension.
pub fn read_source_file(file_path: &str) -> Result<String> {
    let path = Path::new(file_path);

    if !path.exists() {
        bail!("Source file '{}' does not exist", file_path);
    }
    if !path.is_file() {
        bail!("'{}' is not a file", file_path);
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "py" | "txt" | "" => fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file '{}': {}", file_path, e)),
        _ => bail!("Unsupported file type: .{}\nCurrently supported: .py, .txt, and files without extension", extension),
    }
}
