//! Session payload piped by the host CLI on each statusline tick.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StatuslineError;

pub const UNKNOWN_MODEL: &str = "Unknown";

/// What the statusline knows about the running session.
///
/// Every field of the payload is optional. Empty strings and values of the
/// wrong type count as absent, so a partially filled payload still renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub model: String,
    pub current_dir: PathBuf,
    pub session_id: Option<String>,
}

impl SessionContext {
    /// Build the context from the raw payload. `fallback_dir` is used when the
    /// payload names no working directory.
    pub fn from_json(input: &str, fallback_dir: &Path) -> Result<Self, StatuslineError> {
        if input.trim().is_empty() {
            return Err(StatuslineError::EmptyInput);
        }

        let data: Value = serde_json::from_str(input)?;

        let model = str_at(&data, &["model", "display_name"])
            .or_else(|| str_at(&data, &["model", "id"]))
            .unwrap_or(UNKNOWN_MODEL)
            .to_string();

        let current_dir = str_at(&data, &["workspace", "current_dir"])
            .or_else(|| str_at(&data, &["cwd"]))
            .map(PathBuf::from)
            .unwrap_or_else(|| fallback_dir.to_path_buf());

        let session_id = str_at(&data, &["session_id"]).map(str::to_string);

        Ok(Self {
            model,
            current_dir,
            session_id,
        })
    }

    /// Last component of the working directory, as shown in the statusline.
    pub fn dir_name(&self) -> String {
        dir_name(&self.current_dir)
    }
}

/// Last component of `path`, or the whole path when it has none (e.g. `/`).
pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Read the whole payload from stdin.
pub fn read_stdin() -> Result<String, StatuslineError> {
    read_input(std::io::stdin().lock())
}

/// Read `reader` to the end. Invalid UTF-8 is replaced rather than rejected
/// so the JSON parser reports the problem.
pub fn read_input<R: Read>(mut reader: R) -> Result<String, StatuslineError> {
    let mut buf = Vec::with_capacity(4096);
    reader.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str().filter(|s| !s.is_empty())
}
