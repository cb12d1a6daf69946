use runner_types::{ErrorList, Transition};

use crate::validation::EntryViolation;

/// Errors that abort a transition before anything is executed.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The selected operation definition has no command.
    #[error("{transition} command is empty")]
    EmptyCommand { transition: Transition },

    /// One or more payload entries are unusable.
    #[error("invalid payload: {0}")]
    Validation(ErrorList<EntryViolation>),
}
