//! Storyboard error types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storyboard error type
#[derive(Error, Debug)]
pub enum Error {
    /// A collection directory or raw source is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create, delete, write or read failure on a specific path
    #[error("IO error at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    ///
    /// `NotFound` kinds become [`Error::NotFound`] so callers can tell an
    /// absent collection apart from a failing disk.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.display().to_string())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Wrap an I/O error without the `NotFound` translation.
    ///
    /// Used on write paths, where a vanished parent is a failure of the
    /// operation rather than a missing collection.
    pub fn io_strict(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for Storyboard operations
pub type Result<T> = std::result::Result<T, Error>;
