use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;

/// Mapping from payload identifier (filename) to content digest.
///
/// This is the only payload-related artifact stored with resource state.
/// Iteration is sorted by identifier; merge precedence is decided by the
/// caller's insertion order, not by this container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadHashes(BTreeMap<String, ContentDigest>);

impl PayloadHashes {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a digest, replacing any earlier one for the same identifier.
    pub fn insert(&mut self, identifier: impl Into<String>, digest: ContentDigest) -> Option<ContentDigest> {
        self.0.insert(identifier.into(), digest)
    }

    pub fn get(&self, identifier: &str) -> Option<&ContentDigest> {
        self.0.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentDigest)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, ContentDigest)> for PayloadHashes {
    fn from_iter<I: IntoIterator<Item = (String, ContentDigest)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
