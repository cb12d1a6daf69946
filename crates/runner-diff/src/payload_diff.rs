//! Payload diff: compare payload digests and permission bits.
//!
//! Digests are compared key by key under `payloadHashes.<identifier>`. When a
//! trustworthy comparison is impossible, because hashing failed now or because
//! the stored state never recorded digests, a single forced `Updated` at
//! `payloadHashes` is reported instead.

use std::collections::BTreeMap;

use runner_crypto::PartialHashError;
use runner_types::{ContentReference, PayloadHashes};
use tracing::warn;

use crate::kind::{ChangeKind, PropertyChange};
use crate::structural::compare_map;

/// Synthetic path standing for the whole digest map.
pub const PAYLOAD_HASHES_PATH: &str = "payloadHashes";

/// Path prefix for permission-bit changes of kept payload entries.
pub const PAYLOAD_MODES_PATH: &str = "payloadModes";

/// Compare freshly computed digests with the recorded ones.
pub fn diff_payload_hashes(
    previous: Option<&PayloadHashes>,
    desired: &Result<PayloadHashes, PartialHashError>,
) -> Vec<PropertyChange> {
    let desired = match desired {
        Ok(hashes) => hashes,
        Err(e) => {
            warn!(error = %e, "payload hashing failed; assuming payload changed");
            return vec![forced_change()];
        }
    };

    let Some(previous) = previous else {
        warn!("state has no recorded payload hashes; forcing update to backfill");
        return vec![forced_change()];
    };

    let old: BTreeMap<&str, _> = previous.iter().collect();
    let new: BTreeMap<&str, _> = desired.iter().collect();

    let mut changes = Vec::new();
    compare_map(&mut changes, PAYLOAD_HASHES_PATH, &old, &new, false);
    changes
}

/// Report mode changes for identifiers present in both payloads.
///
/// A permission change leaves the digest untouched, so it is only visible
/// here. Added and removed identifiers are already reported by digest.
pub fn diff_payload_modes(
    previous: &[&[ContentReference]],
    desired: &[&[ContentReference]],
) -> Vec<PropertyChange> {
    let old = effective_modes(previous);
    let new = effective_modes(desired);

    old.iter()
        .filter_map(|(identifier, old_mode)| match new.get(identifier) {
            Some(new_mode) if new_mode != old_mode => Some(PropertyChange::new(
                format!("{PAYLOAD_MODES_PATH}.{identifier}"),
                ChangeKind::Updated,
            )),
            _ => None,
        })
        .collect()
}

fn forced_change() -> PropertyChange {
    PropertyChange::new(PAYLOAD_HASHES_PATH, ChangeKind::Updated)
}

/// Identifier to mode, last write wins in layer and entry order.
fn effective_modes<'a>(layers: &[&'a [ContentReference]]) -> BTreeMap<&'a str, Option<u32>> {
    let mut modes = BTreeMap::new();
    for layer in layers {
        for entry in layer.iter() {
            if let Some(identifier) = entry.identifier() {
                modes.insert(identifier, entry.mode);
            }
        }
    }
    modes
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_crypto::{compute_payload_hashes, ContentHash};

    fn hashes(entries: &[(&str, &str)]) -> PayloadHashes {
        entries
            .iter()
            .map(|(name, contents)| {
                let digest = ContentReference::inline(*name, *contents, 0o644)
                    .content_hash()
                    .unwrap();
                (name.to_string(), digest)
            })
            .collect()
    }

    fn paths(changes: &[PropertyChange]) -> Vec<(&str, ChangeKind)> {
        changes.iter().map(|c| (c.path.as_str(), c.kind)).collect()
    }

    #[test]
    fn identical_hashes_no_diff() {
        let h = hashes(&[("a.txt", "v1")]);
        assert!(diff_payload_hashes(Some(&h), &Ok(h.clone())).is_empty());
    }

    #[test]
    fn changed_digest_is_updated() {
        let old = hashes(&[("a.txt", "v1")]);
        let new = hashes(&[("a.txt", "v2")]);
        assert_eq!(
            paths(&diff_payload_hashes(Some(&old), &Ok(new))),
            vec![("payloadHashes.a.txt", ChangeKind::Updated)]
        );
    }

    #[test]
    fn added_and_removed_identifiers() {
        let old = hashes(&[("gone.txt", "x")]);
        let new = hashes(&[("new.txt", "y")]);
        assert_eq!(
            paths(&diff_payload_hashes(Some(&old), &Ok(new))),
            vec![
                ("payloadHashes.gone.txt", ChangeKind::Removed),
                ("payloadHashes.new.txt", ChangeKind::Added),
            ]
        );
    }

    #[test]
    fn absent_previous_forces_single_update() {
        let new = hashes(&[("a.txt", "v1"), ("b.txt", "v2")]);
        assert_eq!(
            paths(&diff_payload_hashes(None, &Ok(new))),
            vec![("payloadHashes", ChangeKind::Updated)]
        );
    }

    #[test]
    fn hashing_failure_forces_single_update() {
        let broken = vec![ContentReference {
            filename: "broken".into(),
            ..ContentReference::default()
        }];
        let desired = compute_payload_hashes([broken.as_slice()]);
        assert!(desired.is_err());

        let old = hashes(&[("broken", "x"), ("other", "y")]);
        assert_eq!(
            paths(&diff_payload_hashes(Some(&old), &desired)),
            vec![("payloadHashes", ChangeKind::Updated)]
        );
    }

    #[test]
    fn mode_change_of_kept_entry() {
        let old = vec![ContentReference::inline("run.sh", "x", 0o644)];
        let new = vec![ContentReference::inline("run.sh", "x", 0o755)];
        assert_eq!(
            paths(&diff_payload_modes(&[old.as_slice()], &[new.as_slice()])),
            vec![("payloadModes.run.sh", ChangeKind::Updated)]
        );
    }

    #[test]
    fn mode_uses_last_write_wins() {
        let old_base = vec![ContentReference::inline("run.sh", "x", 0o644)];
        let old_override = vec![ContentReference::inline("run.sh", "x", 0o755)];
        let new = vec![ContentReference::inline("run.sh", "x", 0o755)];
        assert!(diff_payload_modes(
            &[old_base.as_slice(), old_override.as_slice()],
            &[new.as_slice()]
        )
        .is_empty());
    }

    #[test]
    fn added_identifier_has_no_mode_change() {
        let new = vec![ContentReference::inline("new.sh", "x", 0o755)];
        assert!(diff_payload_modes(&[], &[new.as_slice()]).is_empty());
    }
}
