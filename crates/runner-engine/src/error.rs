use std::io;
use std::path::PathBuf;

use runner_plan::PlanError;
use runner_types::{Transition, Violation};
use thiserror::Error;

/// Failures reported by a [`RemoteExecutor`](crate::RemoteExecutor).
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("could not reach {host}: {reason}")]
    Connection { host: String, reason: String },

    #[error("command `{command}` exited with status {status}")]
    CommandFailed { command: String, status: i32 },

    #[error("payload upload failed: {0}")]
    Payload(#[from] Violation),

    #[error("executor error: {0}")]
    Other(String),
}

/// Failures of a [`StateStore`](crate::StateStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid resource name: {0:?}")]
    InvalidName(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed state for {name}: {source}")]
    Serialization {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors returned by the [`Reconciler`](crate::Reconciler).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resource already exists: {name}")]
    AlreadyExists { name: String },

    #[error("resource not found: {name}")]
    NotFound { name: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("{transition} of {name} failed: {source}")]
    Execution {
        name: String,
        transition: Transition,
        #[source]
        source: ExecutorError,
    },

    #[error("state store error: {0}")]
    Store(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
