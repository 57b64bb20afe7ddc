//! Build errors for the state machine builder.

use crate::descriptor::DescriptorViolation;
use thiserror::Error;

/// Errors that can occur when building a state machine instance.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Descriptor not specified. Call .descriptor(&DESCRIPTOR) before .build()")]
    MissingDescriptor,

    #[error("Context not specified. Call .context(value) before .build()")]
    MissingContext,

    #[error("State type has no states, so there is no initial state")]
    NoInitialState,

    #[error("Descriptor '{machine}' is invalid: {}", format_violations(.violations))]
    InvalidDescriptor {
        machine: &'static str,
        violations: Vec<DescriptorViolation>,
    },
}

fn format_violations(violations: &[DescriptorViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
