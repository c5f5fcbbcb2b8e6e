//! Account Store Errors

use std::path::PathBuf;

/// Errors that can occur while loading or saving the accounts file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if the accounts file could not be written or read
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }
}
