use runner_crypto::compute_payload_hashes;
use runner_diff::ChangeReport;
use runner_plan::{plan, MergedOperation};
use runner_types::{PayloadHashes, ResourceSpecification, ResourceState, Transition};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::executor::{ExecutionRequest, RemoteExecutor};
use crate::store::StateStore;

/// Outcome of one lifecycle transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Applied {
    /// The state written to the store, or that would be written in preview.
    /// For Delete, the state that was removed.
    pub state: ResourceState,
    /// Whether the executor ran.
    pub executed: bool,
    /// Changes against the stored state. Only Update computes them.
    pub changes: Option<ChangeReport>,
}

/// Drives resource instances through `Absent -> Created -> Updated* -> Deleted`.
///
/// Transitions of one instance must be serialized by the caller.
pub struct Reconciler<E, S> {
    executor: E,
    store: S,
    config: EngineConfig,
}

impl<E: RemoteExecutor, S: StateStore> Reconciler<E, S> {
    pub fn new(executor: E, store: S, config: EngineConfig) -> Self {
        Self {
            executor,
            store,
            config,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a new instance.
    ///
    /// With no applicable operation the specification is stored without
    /// payload hashes, so the first diff forces an update.
    pub async fn create(
        &self,
        name: &str,
        spec: ResourceSpecification,
        preview: bool,
    ) -> EngineResult<Applied> {
        if self.store.read(name)?.is_some() {
            return Err(EngineError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let planned = plan(Transition::Create, &spec, self.config.create_validation)?;
        let executed = planned.is_some() && !preview;
        let payload_hashes = match planned {
            Some(operation) => self.run(name, &spec, operation, preview).await?,
            None => None,
        };

        let state = ResourceState::new(spec, payload_hashes);
        self.commit(name, &state, Transition::Create, preview)?;
        Ok(Applied {
            state,
            executed,
            changes: None,
        })
    }

    /// Update an existing instance to `spec`.
    ///
    /// The change report is computed against the stored state before anything
    /// runs. With no applicable operation the recorded hashes are kept.
    pub async fn update(
        &self,
        name: &str,
        spec: ResourceSpecification,
        preview: bool,
    ) -> EngineResult<Applied> {
        let previous = self.load(name)?;
        let changes = runner_diff::diff(&previous, &spec);

        let planned = plan(Transition::Update, &spec, self.config.update_validation)?;
        let executed = planned.is_some() && !preview;
        let payload_hashes = match planned {
            Some(operation) => self.run(name, &spec, operation, preview).await?,
            None => previous.payload_hashes,
        };

        let state = ResourceState::new(spec, payload_hashes);
        self.commit(name, &state, Transition::Update, preview)?;
        Ok(Applied {
            state,
            executed,
            changes: Some(changes),
        })
    }

    /// Tear an instance down using its stored specification, then forget it.
    pub async fn delete(&self, name: &str) -> EngineResult<Applied> {
        let previous = self.load(name)?;

        let planned = plan(
            Transition::Delete,
            &previous.specification,
            self.config.delete_validation,
        )?;
        let executed = planned.is_some();
        if let Some(operation) = planned {
            self.run(name, &previous.specification, operation, false).await?;
        }

        self.store.delete(name)?;
        info!(resource = name, executed, "deleted resource state");
        Ok(Applied {
            state: previous,
            executed,
            changes: None,
        })
    }

    /// Compare the stored state of `name` with `spec`.
    pub fn diff(&self, name: &str, spec: &ResourceSpecification) -> EngineResult<ChangeReport> {
        let previous = self.load(name)?;
        Ok(runner_diff::diff(&previous, spec))
    }

    fn load(&self, name: &str) -> EngineResult<ResourceState> {
        self.store.read(name)?.ok_or_else(|| EngineError::NotFound {
            name: name.to_string(),
        })
    }

    /// Execute `operation` (unless previewing) and hash the layers it used.
    async fn run(
        &self,
        name: &str,
        spec: &ResourceSpecification,
        operation: MergedOperation,
        preview: bool,
    ) -> EngineResult<Option<PayloadHashes>> {
        let transition = operation.transition;
        let request = ExecutionRequest::new(name, spec, operation);

        if preview {
            debug!(resource = name, %transition, "preview; not executing");
        } else {
            self.executor
                .execute(&request, false)
                .await
                .map_err(|source| EngineError::Execution {
                    name: name.to_string(),
                    transition,
                    source,
                })?;
            info!(resource = name, %transition, command = %request.command(), "executed operation");
        }

        match compute_payload_hashes(request.operation.layers()) {
            Ok(hashes) => Ok(Some(hashes)),
            Err(e) => {
                warn!(
                    resource = name,
                    %transition,
                    error = %e,
                    "payload hashing failed; state will carry no payload hashes"
                );
                Ok(None)
            }
        }
    }

    fn commit(
        &self,
        name: &str,
        state: &ResourceState,
        transition: Transition,
        preview: bool,
    ) -> EngineResult<()> {
        if preview {
            return Ok(());
        }
        self.store.write(name, state)?;
        info!(
            resource = name,
            %transition,
            hashed = state.payload_hashes.is_some(),
            "stored resource state"
        );
        Ok(())
    }
}
