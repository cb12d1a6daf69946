use std::fmt;

use runner_types::{ContentReference, ErrorList, Violation};
use serde::{Deserialize, Serialize};

/// How a transition treats payload entries that fail validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPolicy {
    /// Abort the transition with every finding.
    #[default]
    Strict,
    /// Drop the invalid entries and carry on.
    BestEffort,
}

/// Every rule broken by one payload entry.
#[derive(Debug)]
pub struct EntryViolation {
    /// Location of the entry, e.g. `payload[0]` or `create.payload[2]`.
    pub path: String,
    pub filename: Option<String>,
    pub violations: ErrorList<Violation>,
}

impl fmt::Display for EntryViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filename {
            Some(name) => write!(f, "{} ({name}): {}", self.path, self.violations),
            None => write!(f, "{}: {}", self.path, self.violations),
        }
    }
}

/// Validate each entry of one payload layer.
///
/// Returns the entries that passed, in their original order, together with
/// the findings for those that did not.
pub fn validate_layer(
    prefix: &str,
    entries: &[ContentReference],
) -> (Vec<ContentReference>, ErrorList<EntryViolation>) {
    let mut valid = Vec::with_capacity(entries.len());
    let mut findings = ErrorList::new();

    for (index, entry) in entries.iter().enumerate() {
        match entry.validate() {
            Ok(()) => valid.push(entry.clone()),
            Err(violations) => findings.push(EntryViolation {
                path: format!("{prefix}[{index}]"),
                filename: entry.identifier().map(str::to_string),
                violations,
            }),
        }
    }

    (valid, findings)
}
