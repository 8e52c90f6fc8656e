//! Reading JSON configuration files.
//!
//! Manifests are edited while a watch process keeps running, so every read
//! goes straight to disk. Nothing here caches parsed values.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Read and parse a JSON file, bypassing any cache.
///
/// # Errors
/// Returns [`Error::ConfigRead`] or [`Error::ConfigParse`].
pub fn read_json_fresh(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`read_json_fresh`], but tolerates comments and trailing commas
/// (the dialect compiler configs are written in).
///
/// # Errors
/// Returns [`Error::ConfigRead`] or [`Error::ConfigParse`].
pub fn read_jsonc_fresh(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&strip_jsonc(&content)).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove `//` and `/* */` comments and trailing commas outside strings.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut copied = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&input[copied..i]);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                copied = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&input[copied..i]);
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                copied = i;
            }
            b',' => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if matches!(bytes.get(j), Some(b'}' | b']')) {
                    out.push_str(&input[copied..i]);
                    copied = i + 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    out.push_str(&input[copied.min(input.len())..]);
    out
}

/// Recursively merge `overlay` onto `base`. Objects merge key by key;
/// anything else in `overlay` replaces the value in `base`.
#[must_use]
pub fn merge_recursive(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => {
            let mut merged: Map<String, Value> = b.clone();
            for (key, value) in o {
                let next = match merged.get(key) {
                    Some(existing) => merge_recursive(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Names listed under `dependencies`, in declaration order. Version ranges
/// are ignored.
#[must_use]
pub fn dependency_names(manifest: &Value) -> Vec<String> {
    manifest
        .get("dependencies")
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}
