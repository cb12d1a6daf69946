use runner_types::{OperationDefinition, ResourceSpecification, Transition};

/// Pick the operation definition that governs `transition`.
///
/// Create prefers `create` and falls back to `update`; Update prefers
/// `update` and falls back to `create`. Delete only ever uses `delete`.
pub fn select(transition: Transition, spec: &ResourceSpecification) -> Option<&OperationDefinition> {
    match transition {
        Transition::Create => spec.create.as_ref().or(spec.update.as_ref()),
        Transition::Update => spec.update.as_ref().or(spec.create.as_ref()),
        Transition::Delete => spec.delete.as_ref(),
    }
}
