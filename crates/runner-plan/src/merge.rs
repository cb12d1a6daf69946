use std::collections::BTreeMap;

use runner_types::{ContentReference, OperationDefinition, ResourceSpecification, Transition};

use crate::error::PlanError;

/// The command, environment, and payload an executor receives.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedOperation {
    pub transition: Transition,
    pub command: String,
    /// Resource environment overlaid by the operation environment.
    pub environment: BTreeMap<String, String>,
    /// Resource payload followed by operation payload, never deduplicated.
    pub payload: Vec<ContentReference>,
    resource_entries: usize,
}

impl MergedOperation {
    /// The payload split back into its resource and operation layers, in
    /// hashing precedence order.
    pub fn layers(&self) -> [&[ContentReference]; 2] {
        let (resource, operation) = self.payload.split_at(self.resource_entries);
        [resource, operation]
    }
}

/// Merge `operation` over the resource-level defaults of `spec`.
///
/// No payload validation happens here; see [`crate::plan`].
pub fn merge(
    transition: Transition,
    spec: &ResourceSpecification,
    operation: &OperationDefinition,
) -> Result<MergedOperation, PlanError> {
    assemble(
        transition,
        &spec.environment,
        operation,
        spec.payload.clone(),
        operation.payload.clone(),
    )
}

pub(crate) fn assemble(
    transition: Transition,
    base_environment: &BTreeMap<String, String>,
    operation: &OperationDefinition,
    resource_payload: Vec<ContentReference>,
    operation_payload: Vec<ContentReference>,
) -> Result<MergedOperation, PlanError> {
    if operation.command.is_empty() {
        return Err(PlanError::EmptyCommand { transition });
    }

    let mut environment = base_environment.clone();
    environment.extend(
        operation
            .environment
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let resource_entries = resource_payload.len();
    let mut payload = resource_payload;
    payload.extend(operation_payload);

    Ok(MergedOperation {
        transition,
        command: operation.command.clone(),
        environment,
        payload,
        resource_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_types::ConnectionInfo;

    fn base() -> ResourceSpecification {
        let mut spec = ResourceSpecification::new(ConnectionInfo::new("host"));
        spec.environment.insert("REGION".into(), "eu".into());
        spec.environment.insert("LOG".into(), "info".into());
        spec.payload.push(ContentReference::inline("common.sh", "c", 0o644));
        spec
    }

    #[test]
    fn operation_environment_wins_per_key() {
        let op = OperationDefinition::new("run").with_env("LOG", "debug").with_env("EXTRA", "1");
        let merged = merge(Transition::Create, &base(), &op).unwrap();
        assert_eq!(merged.environment.get("REGION").map(String::as_str), Some("eu"));
        assert_eq!(merged.environment.get("LOG").map(String::as_str), Some("debug"));
        assert_eq!(merged.environment.get("EXTRA").map(String::as_str), Some("1"));
    }

    #[test]
    fn payload_is_resource_then_operation_without_dedup() {
        let op = OperationDefinition::new("run")
            .with_payload(ContentReference::inline("common.sh", "override", 0o644));
        let merged = merge(Transition::Update, &base(), &op).unwrap();
        assert_eq!(merged.payload.len(), 2);

        let [resource, operation] = merged.layers();
        assert_eq!(resource.len(), 1);
        assert_eq!(operation.len(), 1);
        assert_eq!(operation[0].contents.raw(), Some("override"));
    }

    #[test]
    fn command_comes_from_operation_only() {
        let op = OperationDefinition::new("./install.sh");
        let merged = merge(Transition::Create, &base(), &op).unwrap();
        assert_eq!(merged.command, "./install.sh");
        assert_eq!(merged.transition, Transition::Create);
    }

    #[test]
    fn empty_command_is_rejected() {
        let op = OperationDefinition::new("");
        let err = merge(Transition::Update, &base(), &op).unwrap_err();
        assert_eq!(err.to_string(), "update command is empty");
    }
}
