//! Error types for wemkit-loc

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RewriteError>;

/// Localization rewrite errors
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Input database file does not exist
    #[error("Database not found: {0}")]
    NotFound(PathBuf),

    /// Filesystem operation on `path` failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// SQL execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RewriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RewriteError::Io {
            path: path.into(),
            source,
        }
    }
}
