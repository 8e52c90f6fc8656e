//! JSON files on their way into the build tree.

use crate::error::{Error, Result};
use serde::de::IgnoredAny;
use serde_json::Value;
use std::path::Path;

/// Check that `bytes` (read from `path`) is well-formed JSON.
///
/// # Errors
/// Returns [`Error::InvalidJson`].
pub fn validate_json(path: &Path, bytes: &[u8]) -> Result<()> {
    serde_json::from_slice::<IgnoredAny>(bytes)
        .map(|_| ())
        .map_err(|source| Error::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
}

/// Turn a JSON document into an ES module whose default export is the
/// document.
///
/// # Errors
/// Returns [`Error::InvalidJson`].
pub fn json_module(path: &Path, bytes: &[u8]) -> Result<String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| Error::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(value_module(&value))
}

#[must_use]
pub fn value_module(value: &Value) -> String {
    format!("export default {value};")
}
