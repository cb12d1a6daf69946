use std::fmt;

use serde::Serialize;

/// Generic field-level difference, before replace semantics are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldChange {
    Added,
    Removed,
    Updated,
}

/// How a property changed, and whether the change can be applied in place.
///
/// The `*Replace` variants mean the resource must be destroyed and recreated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    Added,
    Removed,
    Updated,
    UpdatedReplace,
    AddedReplace,
    RemovedReplace,
}

impl ChangeKind {
    /// Translate a generic field change for a field that is, or is not, immutable.
    pub fn classify(change: FieldChange, replace: bool) -> Self {
        match (change, replace) {
            (FieldChange::Added, false) => Self::Added,
            (FieldChange::Removed, false) => Self::Removed,
            (FieldChange::Updated, false) => Self::Updated,
            (FieldChange::Added, true) => Self::AddedReplace,
            (FieldChange::Removed, true) => Self::RemovedReplace,
            (FieldChange::Updated, true) => Self::UpdatedReplace,
        }
    }

    /// Returns `true` if this change forces a replacement.
    pub fn is_replace(&self) -> bool {
        matches!(
            self,
            Self::UpdatedReplace | Self::AddedReplace | Self::RemovedReplace
        )
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Updated => "updated",
            Self::UpdatedReplace => "updated (replace)",
            Self::AddedReplace => "added (replace)",
            Self::RemovedReplace => "removed (replace)",
        };
        f.write_str(s)
    }
}

/// One changed property path, e.g. `connection.host` or `payloadHashes.a.txt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyChange {
    pub path: String,
    pub kind: ChangeKind,
}

impl PropertyChange {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
