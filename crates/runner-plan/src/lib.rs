//! Operation selection for runner.
//!
//! Every Create, Update, or Delete first decides which operation definition
//! governs the transition, checks every payload entry it would upload, and
//! merges the operation's environment and payload over the resource-level
//! defaults. The result is a [`MergedOperation`] ready for an executor, or
//! `None` when the transition has nothing to run.
//!
//! # Quick Start
//!
//! ```rust
//! use runner_plan::{plan, ValidationPolicy};
//! use runner_types::{
//!     ConnectionInfo, ContentReference, OperationDefinition, ResourceSpecification, Transition,
//! };
//!
//! let mut spec = ResourceSpecification::new(ConnectionInfo::new("10.0.0.5"));
//! spec.payload.push(ContentReference::inline("env.sh", "export A=1", 0o644));
//! spec.update = Some(OperationDefinition::new("./deploy.sh").with_env("STAGE", "prod"));
//!
//! // No create definition: Create falls back to the update definition.
//! let merged = plan(Transition::Create, &spec, ValidationPolicy::Strict)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(merged.command, "./deploy.sh");
//! assert_eq!(merged.payload.len(), 1);
//! ```

pub mod error;
pub mod merge;
pub mod selector;
pub mod validation;

pub use error::PlanError;
pub use merge::{merge, MergedOperation};
pub use selector::select;
pub use validation::{validate_layer, EntryViolation, ValidationPolicy};

use runner_types::{ResourceSpecification, Transition};
use tracing::{debug, warn};

/// Select, validate, and merge the operation for `transition`.
///
/// Returns `Ok(None)` when no operation definition applies, meaning the
/// transition is a no-op. Under [`ValidationPolicy::Strict`] any invalid
/// payload entry aborts with every finding at once; under
/// [`ValidationPolicy::BestEffort`] invalid entries are dropped and logged.
/// An empty command is fatal under both policies.
pub fn plan(
    transition: Transition,
    spec: &ResourceSpecification,
    policy: ValidationPolicy,
) -> Result<Option<MergedOperation>, PlanError> {
    let Some(operation) = select(transition, spec) else {
        debug!(%transition, "no operation defined; nothing to run");
        return Ok(None);
    };

    let (resource_payload, mut violations) = validate_layer("payload", &spec.payload);
    let (operation_payload, operation_violations) =
        validate_layer(&format!("{transition}.payload"), &operation.payload);
    violations.merge(operation_violations);

    if !violations.is_empty() {
        match policy {
            ValidationPolicy::Strict => return Err(PlanError::Validation(violations)),
            ValidationPolicy::BestEffort => {
                for violation in &violations {
                    warn!(%transition, path = %violation.path, error = %violation, "dropping invalid payload entry");
                }
            }
        }
    }

    let merged = merge::assemble(
        transition,
        &spec.environment,
        operation,
        resource_payload,
        operation_payload,
    )?;

    debug!(
        %transition,
        payload = merged.payload.len(),
        environment = merged.environment.len(),
        "planned operation"
    );
    Ok(Some(merged))
}
