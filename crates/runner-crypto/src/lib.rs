//! Content hashing for runner.
//!
//! Provides domain-separated, streaming BLAKE3 digests of file payloads and the
//! layered aggregation that turns ordered payload layers into a
//! [`PayloadHashes`](runner_types::PayloadHashes) map.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod payload;

pub use hasher::{ContentHash, ContentHasher, HashError};
pub use payload::{compute_payload_hashes, PartialHashError};
