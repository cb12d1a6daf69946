//! Reconciliation engine for runner.
//!
//! Ties operation planning, payload hashing, and change detection to a
//! pluggable executor and state store.
//!
//! # Key Types
//!
//! - [`Reconciler`] -- Create / update / delete / diff for named resource instances
//! - [`RemoteExecutor`] / [`ExecutionRequest`] -- The transport contract
//! - [`StateStore`] -- Persistence of applied state ([`InMemoryStateStore`], [`FileStateStore`])
//! - [`EngineConfig`] -- Store location and per-transition validation policy

pub mod config;
pub mod error;
pub mod executor;
pub mod reconciler;
pub mod store;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, EngineResult, ExecutorError, StoreError};
pub use executor::{
    ExecutionRequest, PayloadFile, RecordedCall, RecordedFile, RecordingExecutor, RemoteExecutor,
};
pub use reconciler::{Applied, Reconciler};
pub use store::{validate_name, FileStateStore, InMemoryStateStore, StateStore};
