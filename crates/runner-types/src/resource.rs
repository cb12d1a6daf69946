use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionInfo;
use crate::content::ContentReference;
use crate::payload::PayloadHashes;
use crate::transition::Transition;

/// Opaque per-resource configuration handed through to the executor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutorConfig(pub serde_json::Value);

/// A per-transition command override.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub command: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<ContentReference>,
}

impl OperationDefinition {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_payload(mut self, entry: ContentReference) -> Self {
        self.payload.push(entry);
        self
    }
}

/// The desired configuration of one remote-execution resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpecification {
    pub connection: ConnectionInfo,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<ContentReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<OperationDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<OperationDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ExecutorConfig>,
}

impl ResourceSpecification {
    pub fn new(connection: ConnectionInfo) -> Self {
        Self {
            connection,
            ..Self::default()
        }
    }

    /// The operation definition declared for exactly this transition, without fallback.
    pub fn operation(&self, transition: Transition) -> Option<&OperationDefinition> {
        match transition {
            Transition::Create => self.create.as_ref(),
            Transition::Update => self.update.as_ref(),
            Transition::Delete => self.delete.as_ref(),
        }
    }
}

/// A specification as last applied, plus the payload digests recorded then.
///
/// `payload_hashes` is `None` for state that predates hash tracking, which is
/// not the same as an empty map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    #[serde(flatten)]
    pub specification: ResourceSpecification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_hashes: Option<PayloadHashes>,
}

impl ResourceState {
    pub fn new(specification: ResourceSpecification, payload_hashes: Option<PayloadHashes>) -> Self {
        Self {
            specification,
            payload_hashes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContentDigest;

    #[test]
    fn operation_lookup_has_no_fallback() {
        let spec = ResourceSpecification {
            update: Some(OperationDefinition::new("./update.sh")),
            ..ResourceSpecification::new(ConnectionInfo::new("host"))
        };
        assert!(spec.operation(Transition::Create).is_none());
        assert!(spec.operation(Transition::Update).is_some());
    }

    #[test]
    fn state_flattens_specification() {
        let mut hashes = PayloadHashes::new();
        hashes.insert("a.txt", ContentDigest::from_hash([7; 32]));
        let state = ResourceState::new(
            ResourceSpecification::new(ConnectionInfo::new("example.com")),
            Some(hashes),
        );
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["connection"]["host"], "example.com");
        assert!(value["payloadHashes"]["a.txt"].is_string());
    }

    #[test]
    fn absent_hashes_differ_from_empty_hashes() {
        let absent: ResourceState =
            serde_json::from_str(r#"{"connection":{"host":"h"}}"#).unwrap();
        let empty: ResourceState =
            serde_json::from_str(r#"{"connection":{"host":"h"},"payloadHashes":{}}"#).unwrap();
        assert_eq!(absent.payload_hashes, None);
        assert_eq!(empty.payload_hashes, Some(PayloadHashes::new()));
    }

    #[test]
    fn operation_definition_parses_with_defaults() {
        let op: OperationDefinition = serde_json::from_str(r#"{"command":"make"}"#).unwrap();
        assert_eq!(op.command, "make");
        assert!(op.environment.is_empty());
        assert!(op.payload.is_empty());
    }
}
