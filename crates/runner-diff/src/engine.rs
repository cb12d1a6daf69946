use runner_crypto::compute_payload_hashes;
use runner_plan::select;
use runner_types::{ContentReference, ResourceSpecification, ResourceState, Transition};
use tracing::debug;

use crate::payload_diff::{diff_payload_hashes, diff_payload_modes};
use crate::report::ChangeReport;
use crate::structural::diff_specifications;

/// The payload layers an update of `spec` would upload, in hashing order:
/// the resource payload, then the payload of the update-selected operation.
pub fn payload_layers(spec: &ResourceSpecification) -> Vec<&[ContentReference]> {
    let mut layers = vec![spec.payload.as_slice()];
    if let Some(operation) = select(Transition::Update, spec) {
        layers.push(operation.payload.as_slice());
    }
    layers
}

/// Compare stored state with a desired specification.
///
/// Never fails: a payload that cannot be hashed is reported as a forced change
/// at `payloadHashes` instead.
pub fn diff(previous: &ResourceState, desired: &ResourceSpecification) -> ChangeReport {
    let mut changes = diff_specifications(&previous.specification, desired);

    let desired_layers = payload_layers(desired);
    let desired_hashes = compute_payload_hashes(desired_layers.iter().copied());
    changes.extend(diff_payload_hashes(
        previous.payload_hashes.as_ref(),
        &desired_hashes,
    ));
    changes.extend(diff_payload_modes(
        &payload_layers(&previous.specification),
        &desired_layers,
    ));

    let report = ChangeReport::new(changes);
    debug!(
        changes = report.len(),
        replace = report.requires_replace(),
        "computed change report"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ChangeKind;
    use proptest::prelude::*;
    use runner_types::{ConnectionInfo, OperationDefinition, PayloadHashes};

    fn spec_with(payload: Vec<ContentReference>) -> ResourceSpecification {
        let mut spec = ResourceSpecification::new(ConnectionInfo::new("10.0.0.1"));
        spec.payload = payload;
        spec.update = Some(OperationDefinition::new("./apply.sh"));
        spec
    }

    /// State as it would be stored right after applying `spec`.
    fn applied(spec: &ResourceSpecification) -> ResourceState {
        let hashes = compute_payload_hashes(payload_layers(spec)).unwrap();
        ResourceState::new(spec.clone(), Some(hashes))
    }

    fn paths(report: &ChangeReport) -> Vec<(&str, ChangeKind)> {
        report.detailed().collect()
    }

    #[test]
    fn unchanged_specification_has_no_changes() {
        let spec = spec_with(vec![ContentReference::inline("a.txt", "v1", 0o644)]);
        let report = diff(&applied(&spec), &spec);
        assert!(!report.has_changes());
    }

    #[test]
    fn content_update_is_reported() {
        let old = spec_with(vec![ContentReference::inline("a.txt", "v1", 0o644)]);
        let new = spec_with(vec![ContentReference::inline("a.txt", "v2", 0o644)]);
        let report = diff(&applied(&old), &new);
        assert_eq!(paths(&report), vec![("payloadHashes.a.txt", ChangeKind::Updated)]);
    }

    #[test]
    fn removed_entry_is_reported() {
        let old = spec_with(vec![
            ContentReference::inline("a.txt", "v1", 0o644),
            ContentReference::inline("b.txt", "v1", 0o644),
        ]);
        let new = spec_with(vec![ContentReference::inline("a.txt", "v1", 0o644)]);
        let report = diff(&applied(&old), &new);
        assert_eq!(paths(&report), vec![("payloadHashes.b.txt", ChangeKind::Removed)]);
    }

    #[test]
    fn added_entry_is_reported() {
        let old = spec_with(vec![ContentReference::inline("a.txt", "v1", 0o644)]);
        let new = spec_with(vec![
            ContentReference::inline("a.txt", "v1", 0o644),
            ContentReference::inline("c.txt", "v1", 0o644),
        ]);
        let report = diff(&applied(&old), &new);
        assert_eq!(paths(&report), vec![("payloadHashes.c.txt", ChangeKind::Added)]);
    }

    #[test]
    fn absent_hashes_force_a_change() {
        let spec = spec_with(vec![ContentReference::inline("a.txt", "v1", 0o644)]);
        let state = ResourceState::new(spec.clone(), None);
        let report = diff(&state, &spec);
        assert_eq!(paths(&report), vec![("payloadHashes", ChangeKind::Updated)]);
    }

    #[test]
    fn empty_recorded_hashes_are_not_absent() {
        let spec = spec_with(Vec::new());
        let state = ResourceState::new(spec.clone(), Some(PayloadHashes::new()));
        assert!(!diff(&state, &spec).has_changes());
    }

    #[test]
    fn vanished_local_file_forces_single_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "v1").unwrap();

        let spec = spec_with(vec![ContentReference::local(
            path.to_string_lossy(),
            "a.txt",
            0o644,
        )]);
        let state = applied(&spec);
        std::fs::remove_file(&path).unwrap();

        let report = diff(&state, &spec);
        assert_eq!(paths(&report), vec![("payloadHashes", ChangeKind::Updated)]);
    }

    #[test]
    fn local_to_inline_with_same_bytes_is_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.sh");
        std::fs::write(&path, "echo hi\n").unwrap();

        let old = spec_with(vec![ContentReference::local(
            path.to_string_lossy(),
            "run.sh",
            0o755,
        )]);
        let new = spec_with(vec![ContentReference::inline("run.sh", "echo hi\n", 0o755)]);
        assert!(!diff(&applied(&old), &new).has_changes());
    }

    #[test]
    fn mode_change_without_content_change() {
        let old = spec_with(vec![ContentReference::inline("run.sh", "x", 0o644)]);
        let new = spec_with(vec![ContentReference::inline("run.sh", "x", 0o755)]);
        let report = diff(&applied(&old), &new);
        assert_eq!(paths(&report), vec![("payloadModes.run.sh", ChangeKind::Updated)]);
    }

    #[test]
    fn operation_payload_overrides_resource_payload() {
        let mut old = spec_with(vec![ContentReference::inline("cfg", "base", 0o644)]);
        old.update = Some(
            OperationDefinition::new("./apply.sh")
                .with_payload(ContentReference::inline("cfg", "override", 0o644)),
        );
        let mut new = old.clone();
        new.payload[0] = ContentReference::inline("cfg", "base v2", 0o644);

        // The override still wins, so the effective digest is unchanged.
        assert!(!diff(&applied(&old), &new).has_changes());
    }

    #[test]
    fn structural_changes_come_first() {
        let old = spec_with(vec![ContentReference::inline("a.txt", "v1", 0o644)]);
        let mut new = spec_with(vec![ContentReference::inline("a.txt", "v2", 0o644)]);
        new.connection.host = "10.0.0.9".into();
        let report = diff(&applied(&old), &new);
        assert_eq!(
            paths(&report),
            vec![
                ("connection.host", ChangeKind::UpdatedReplace),
                ("payloadHashes.a.txt", ChangeKind::Updated),
            ]
        );
        assert!(report.requires_replace());
    }

    #[test]
    fn repeated_diffs_are_identical() {
        let old = spec_with(vec![ContentReference::inline("a.txt", "v1", 0o644)]);
        let mut new = spec_with(vec![ContentReference::inline("b.txt", "v1", 0o600)]);
        new.environment.insert("STAGE".into(), "prod".into());
        let state = applied(&old);
        assert_eq!(diff(&state, &new), diff(&state, &new));
    }

    fn arb_entry() -> impl Strategy<Value = ContentReference> {
        (
            "[a-z]{1,6}\\.txt",
            proptest::collection::vec(any::<u8>(), 0..64),
            prop_oneof![Just(0o644u32), Just(0o755u32), Just(0o600u32)],
        )
            .prop_map(|(name, bytes, mode)| {
                let contents: String = bytes.iter().map(|b| char::from(b'a' + b % 26)).collect();
                ContentReference::inline(name, contents, mode)
            })
    }

    proptest! {
        #[test]
        fn applied_state_diffs_clean(
            resource in proptest::collection::vec(arb_entry(), 0..6),
            operation in proptest::collection::vec(arb_entry(), 0..4),
        ) {
            let mut spec = spec_with(resource);
            spec.update = Some(OperationDefinition {
                payload: operation,
                ..OperationDefinition::new("./apply.sh")
            });
            let report = diff(&applied(&spec), &spec);
            prop_assert!(!report.has_changes(), "unexpected changes: {:?}", report.changes());
        }
    }
}
