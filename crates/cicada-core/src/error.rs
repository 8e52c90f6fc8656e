//! Error type shared by every stage of the build.

use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, one per [`Error`] variant.
pub mod codes {
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
    pub const CONFIG_PARSE_FAILED: &str = "CONFIG_PARSE_FAILED";
    pub const CONFIGURATION_INVALID: &str = "CONFIGURATION_INVALID";
    pub const IMPORT_UNRESOLVED: &str = "IMPORT_UNRESOLVED";
    pub const MODULE_FORMAT_UNSUPPORTED: &str = "MODULE_FORMAT_UNSUPPORTED";
    pub const DEPENDENCY_NOT_FOUND: &str = "DEPENDENCY_NOT_FOUND";
    pub const DEPENDENCY_CONFLICT: &str = "DEPENDENCY_CONFLICT";
    pub const PROJECT_INVALID: &str = "PROJECT_INVALID";
    pub const JSON_INVALID: &str = "JSON_INVALID";
}

/// Core error type for cicada-build operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed pattern, or a candidate whose wildcard does not fit its alias.
    #[error("{0}")]
    Configuration(String),

    #[error("{}: Module {specifier} not found in {}", .importer.display(), format_candidates(.candidates))]
    UnresolvedImport {
        importer: PathBuf,
        specifier: String,
        /// Rendered candidate patterns that were tried; empty if no alias matched.
        candidates: Vec<String>,
    },

    #[error("Package {package}: {reason}")]
    UnsupportedModuleFormat { package: String, reason: String },

    #[error("Package {package} is not found anywhere above {}. Did you really install it?", .from.display())]
    DependencyNotFound { package: String, from: PathBuf },

    #[error("Conflicting versions of {package} need vendoring ({} and {}), which is not supported", .first.display(), .second.display())]
    DependencyConflict {
        package: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid project: {0}")]
    InvalidProject(String),

    #[error("{}: invalid JSON: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "the alias table or in dependencies".to_string()
    } else {
        format!("[{}]", candidates.join(", "))
    }
}

impl Error {
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    #[must_use]
    pub fn invalid_project(msg: impl Into<String>) -> Self {
        Self::InvalidProject(msg.into())
    }

    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => codes::IO_ERROR,
            Self::ConfigRead { .. } => codes::CONFIG_READ_FAILED,
            Self::ConfigParse { .. } => codes::CONFIG_PARSE_FAILED,
            Self::Configuration(_) => codes::CONFIGURATION_INVALID,
            Self::UnresolvedImport { .. } => codes::IMPORT_UNRESOLVED,
            Self::UnsupportedModuleFormat { .. } => codes::MODULE_FORMAT_UNSUPPORTED,
            Self::DependencyNotFound { .. } => codes::DEPENDENCY_NOT_FOUND,
            Self::DependencyConflict { .. } => codes::DEPENDENCY_CONFLICT,
            Self::InvalidProject(_) => codes::PROJECT_INVALID,
            Self::InvalidJson { .. } => codes::JSON_INVALID,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_uppercase() {
        let all_codes = [
            codes::IO_ERROR,
            codes::CONFIG_READ_FAILED,
            codes::CONFIG_PARSE_FAILED,
            codes::CONFIGURATION_INVALID,
            codes::IMPORT_UNRESOLVED,
            codes::MODULE_FORMAT_UNSUPPORTED,
            codes::DEPENDENCY_NOT_FOUND,
            codes::DEPENDENCY_CONFLICT,
            codes::PROJECT_INVALID,
            codes::JSON_INVALID,
        ];

        for code in all_codes {
            assert!(
                code.chars().all(|c| c.is_uppercase() || c == '_'),
                "Error code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }

    #[test]
    fn test_unresolved_import_lists_candidates() {
        let err = Error::UnresolvedImport {
            importer: PathBuf::from("src/main.ts"),
            specifier: "@lib/util".to_string(),
            candidates: vec!["lib/*".to_string(), "vendor/lib/*.js".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("@lib/util"));
        assert!(msg.contains("[lib/*, vendor/lib/*.js]"));
        assert_eq!(err.code(), codes::IMPORT_UNRESOLVED);
    }

    #[test]
    fn test_unresolved_import_without_alias() {
        let err = Error::UnresolvedImport {
            importer: PathBuf::from("src/main.ts"),
            specifier: "left-pad".to_string(),
            candidates: Vec::new(),
        };
        assert!(err.to_string().contains("alias table or in dependencies"));
    }
}
