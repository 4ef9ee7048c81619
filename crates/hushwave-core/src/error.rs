//! Core error types.

use std::path::PathBuf;

use crate::paths::PathError;

/// Errors raised while loading or saving core domain data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A data path could not be resolved.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Reading or writing a file failed.
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A settings value is outside its accepted range.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}
