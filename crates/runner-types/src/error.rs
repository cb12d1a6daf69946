use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors raised while resolving the source of a [`crate::ContentReference`].
#[derive(Debug, Error)]
pub enum ContentError {
    /// Both `localPath` and `contents` were supplied.
    #[error("cannot set both localPath and contents")]
    Conflict,

    /// Neither `localPath` nor `contents` was supplied.
    #[error("exactly one of localPath or contents must be set")]
    MissingSource,

    /// The local file could not be opened or read.
    #[error("failed to read local file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ContentError {
    /// Wrap an I/O failure for the given path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
