//! Layered payload hash aggregation.
//!
//! Payload identifiers double as merge keys between resource-level defaults
//! and operation-specific overrides. Layers are walked in the order given and
//! entries in declaration order, so a later entry with the same identifier
//! always replaces an earlier one.

use runner_types::{ContentReference, ErrorList, PayloadHashes};
use tracing::debug;

use crate::hasher::{ContentHash, HashError};

/// Hashing failed for at least one entry.
///
/// `partial` holds every entry that did hash; it must not be trusted as a
/// complete picture of the payload.
#[derive(Debug, thiserror::Error)]
#[error("failed to hash {count} payload file(s): {errors}", count = .errors.len())]
pub struct PartialHashError {
    pub partial: PayloadHashes,
    pub errors: ErrorList<HashError>,
}

/// Compute identifier to digest for ordered payload layers.
///
/// Entries without an identifier are skipped. A failing entry does not stop
/// the traversal; all failures are returned together alongside the partial map.
pub fn compute_payload_hashes<'a, L>(layers: L) -> Result<PayloadHashes, PartialHashError>
where
    L: IntoIterator<Item = &'a [ContentReference]>,
{
    let mut hashes = PayloadHashes::new();
    let mut errors = ErrorList::new();

    for (layer_index, layer) in layers.into_iter().enumerate() {
        for entry in layer {
            let Some(identifier) = entry.identifier() else {
                debug!(layer = layer_index, "skipping payload entry without filename");
                continue;
            };

            match entry.content_hash() {
                Ok(digest) => {
                    debug!(layer = layer_index, filename = identifier, digest = %digest.short_hex(), "hashed payload entry");
                    hashes.insert(identifier, digest);
                }
                Err(e) => errors.push(e),
            }
        }
    }

    match errors.into_result() {
        Ok(()) => Ok(hashes),
        Err(errors) => Err(PartialHashError {
            partial: hashes,
            errors,
        }),
    }
}
