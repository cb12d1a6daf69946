//! Structural diff: a typed, field-by-field comparison of two specifications.
//!
//! The compared field set is fixed. Payload lists, both resource-level and
//! per-operation, are deliberately absent: their contents are tracked by digest
//! in [`crate::payload_diff`]. Command text is compared like any other field.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use runner_types::{ConnectionInfo, OperationDefinition, ResourceSpecification, Transition};

use crate::kind::{ChangeKind, FieldChange, PropertyChange};

/// Compare every non-payload field of two specifications.
///
/// Changes are returned in a fixed order: connection, environment, the
/// create/update/delete definitions, then executor config.
pub fn diff_specifications(
    old: &ResourceSpecification,
    new: &ResourceSpecification,
) -> Vec<PropertyChange> {
    let mut changes = Vec::new();

    diff_connection(&mut changes, &old.connection, &new.connection);
    compare_map(&mut changes, "environment", &old.environment, &new.environment, false);

    for transition in [Transition::Create, Transition::Update, Transition::Delete] {
        diff_operation(
            &mut changes,
            transition.as_str(),
            old.operation(transition),
            new.operation(transition),
        );
    }

    compare_option(&mut changes, "config", old.config.as_ref(), new.config.as_ref(), false);

    changes
}

fn diff_connection(changes: &mut Vec<PropertyChange>, old: &ConnectionInfo, new: &ConnectionInfo) {
    // Identity fields: a different target is a different resource.
    compare_value(changes, "connection.host", &old.host, &new.host, true);
    compare_option(changes, "connection.port", old.port.as_ref(), new.port.as_ref(), true);
    compare_option(changes, "connection.user", old.user.as_ref(), new.user.as_ref(), true);

    compare_option(
        changes,
        "connection.password",
        old.password.as_ref(),
        new.password.as_ref(),
        false,
    );
    compare_option(
        changes,
        "connection.privateKey",
        old.private_key.as_ref(),
        new.private_key.as_ref(),
        false,
    );
    compare_option(
        changes,
        "connection.agentSocketPath",
        old.agent_socket_path.as_ref(),
        new.agent_socket_path.as_ref(),
        false,
    );
}

fn diff_operation(
    changes: &mut Vec<PropertyChange>,
    root: &str,
    old: Option<&OperationDefinition>,
    new: Option<&OperationDefinition>,
) {
    match (old, new) {
        (None, None) => {}
        (None, Some(_)) => changes.push(PropertyChange::new(root, ChangeKind::Added)),
        (Some(_), None) => changes.push(PropertyChange::new(root, ChangeKind::Removed)),
        (Some(old), Some(new)) => {
            compare_value(changes, &format!("{root}.command"), &old.command, &new.command, false);
            compare_map(
                changes,
                &format!("{root}.environment"),
                &old.environment,
                &new.environment,
                false,
            );
        }
    }
}

fn compare_value<T: PartialEq>(
    changes: &mut Vec<PropertyChange>,
    path: &str,
    old: &T,
    new: &T,
    replace: bool,
) {
    if old != new {
        changes.push(PropertyChange::new(
            path,
            ChangeKind::classify(FieldChange::Updated, replace),
        ));
    }
}

fn compare_option<T: PartialEq>(
    changes: &mut Vec<PropertyChange>,
    path: &str,
    old: Option<&T>,
    new: Option<&T>,
    replace: bool,
) {
    let change = match (old, new) {
        (None, None) => return,
        (None, Some(_)) => FieldChange::Added,
        (Some(_), None) => FieldChange::Removed,
        (Some(a), Some(b)) if a == b => return,
        (Some(_), Some(_)) => FieldChange::Updated,
    };
    changes.push(PropertyChange::new(path, ChangeKind::classify(change, replace)));
}

/// Key-by-key comparison of two maps, emitted in sorted key order as
/// `<prefix>.<key>`.
pub(crate) fn compare_map<K: Ord + fmt::Display, V: PartialEq>(
    changes: &mut Vec<PropertyChange>,
    prefix: &str,
    old: &BTreeMap<K, V>,
    new: &BTreeMap<K, V>,
    replace: bool,
) {
    let keys: BTreeSet<&K> = old.keys().chain(new.keys()).collect();
    for key in keys {
        compare_option(changes, &format!("{prefix}.{key}"), old.get(key), new.get(key), replace);
    }
}
