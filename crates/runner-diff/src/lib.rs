//! Diff engine for runner.
//!
//! Compares a previously applied [`ResourceState`](runner_types::ResourceState)
//! with a newly desired specification and reports which properties changed and
//! how. Payload contents are never compared by value: they are compared by
//! content digest, and failure to compute a digest is reported as a change
//! rather than an error.
//!
//! # Key Types
//!
//! - [`ChangeReport`] / [`PropertyChange`] / [`ChangeKind`] -- The combined result
//! - [`diff_specifications`] -- Typed field-by-field structural comparison
//! - [`diff_payload_hashes`] -- Content-hash comparison with forced-change fallback
//! - [`diff`] -- Both halves over a state and a desired specification

pub mod engine;
pub mod kind;
pub mod payload_diff;
pub mod report;
pub mod structural;

pub use engine::{diff, payload_layers};
pub use kind::{ChangeKind, FieldChange, PropertyChange};
pub use payload_diff::{diff_payload_hashes, diff_payload_modes, PAYLOAD_HASHES_PATH, PAYLOAD_MODES_PATH};
pub use report::ChangeReport;
pub use structural::diff_specifications;
