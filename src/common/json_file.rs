//! Whole-file JSON persistence shared by the stores.
//!
//! Files are rewritten in place: there is no temp-file-then-rename step, so a
//! crash mid-write can leave a truncated file behind. A truncated file is then
//! read back as empty state.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::common::errors::AgentResult;

/// Read `path` as JSON.
///
/// A missing file yields `T::default()`. So does a file that is not valid JSON
/// for `T`, after logging a warning.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn read_or_default<T>(path: &Path) -> AgentResult<T>
where
    T: DeserializeOwned + Default,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "store file missing, starting empty");
            return Ok(T::default());
        }
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "store file is malformed, starting empty");
            Ok(T::default())
        }
    }
}

/// Serialize `value` as indented JSON and overwrite `path`.
///
/// Missing parent directories are created.
///
/// # Errors
/// Returns an error if serialization or any filesystem call fails.
pub fn write<T>(path: &Path, value: &T) -> AgentResult<()>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "store file written");
    Ok(())
}
