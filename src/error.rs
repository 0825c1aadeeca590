//! Error types for document generation.
//!
//! Every generator error is fatal for the `generate()` call that raised it;
//! no partial document is ever returned or cached.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug, Error)]
pub enum Error {
    /// A route path contains a placeholder that cannot be parsed.
    #[error("malformed route path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// The requested API version is not configured.
    #[error("unknown API version '{version}' (available: {})", .available.join(", "))]
    UnknownVersion {
        version: String,
        available: Vec<String>,
    },

    /// A schema reference names a schema that was never registered.
    #[error("unknown schema reference '{name}'")]
    UnknownReference { name: String },

    /// A schema name is taken by a different shape and cannot be disambiguated.
    #[error("schema name '{name}' is already registered with a different shape")]
    SchemaNameCollision { name: String },

    /// The manifest file is structurally invalid.
    #[error("invalid manifest {}: {message}", .file.display())]
    InvalidManifest { file: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn malformed_path(path: &str, reason: impl Into<String>) -> Self {
        Error::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_reference(name: &str) -> Self {
        Error::UnknownReference {
            name: name.to_string(),
        }
    }
}
