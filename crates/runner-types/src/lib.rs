//! Foundation types for runner.
//!
//! This crate provides the data model shared by every other runner crate: the
//! desired [`ResourceSpecification`], the persisted [`ResourceState`], file
//! payloads described by [`ContentReference`], and the error kinds raised while
//! resolving them.
//!
//! # Key Types
//!
//! - [`TextField`] -- Tri-state optional string (`Unset | Blank | Value`)
//! - [`ContentReference`] -- A file payload backed by a local path or inline contents
//! - [`ContentDigest`] -- 256-bit content hash, hex-encoded when persisted
//! - [`PayloadHashes`] -- Identifier to digest map stored with resource state
//! - [`OperationDefinition`] -- Per-transition command override
//! - [`ResourceSpecification`] / [`ResourceState`] -- Desired input and applied state
//! - [`ErrorList`] -- Ordered accumulator reporting every problem at once

pub mod connection;
pub mod content;
pub mod digest;
pub mod error;
pub mod error_list;
pub mod field;
pub mod payload;
pub mod resource;
pub mod transition;

pub use connection::ConnectionInfo;
pub use content::{ContentReader, ContentReference, Violation};
pub use digest::ContentDigest;
pub use error::{ContentError, TypeError};
pub use error_list::ErrorList;
pub use field::TextField;
pub use payload::PayloadHashes;
pub use resource::{ExecutorConfig, OperationDefinition, ResourceSpecification, ResourceState};
pub use transition::Transition;
