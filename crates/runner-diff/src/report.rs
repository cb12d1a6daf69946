use serde::Serialize;

use crate::kind::{ChangeKind, PropertyChange};

/// The result of comparing stored state with a desired specification.
///
/// `has_changes` is true exactly when `changes` is non-empty. Entries keep
/// the order they were produced in: structural changes first, then payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    has_changes: bool,
    changes: Vec<PropertyChange>,
}

impl ChangeReport {
    pub fn new(changes: Vec<PropertyChange>) -> Self {
        Self {
            has_changes: !changes.is_empty(),
            changes,
        }
    }

    /// Returns `true` if anything differs.
    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }

    /// The change recorded at `path`, if any.
    pub fn get(&self, path: &str) -> Option<ChangeKind> {
        self.changes
            .iter()
            .find(|c| c.path == path)
            .map(|c| c.kind)
    }

    /// Returns `true` if any change forces the resource to be recreated.
    pub fn requires_replace(&self) -> bool {
        self.changes.iter().any(|c| c.kind.is_replace())
    }

    /// Path to kind, in report order.
    pub fn detailed(&self) -> impl Iterator<Item = (&str, ChangeKind)> {
        self.changes.iter().map(|c| (c.path.as_str(), c.kind))
    }
}
