//! Builder for constructing state machine instances.

use crate::builder::error::BuildError;
use crate::core::State;
use crate::descriptor::{validate, Descriptor, Machine};
use crate::engine::{CriticalSection, EngineConfig, NoCriticalSection, StateMachine};
use std::sync::Arc;
use stillwater::validation::Validation;

/// Builder for constructing state machine instances with a fluent API.
///
/// The descriptor is validated on `build()`; every table defect is reported
/// at once.
pub struct StateMachineBuilder<M: Machine> {
    descriptor: Option<&'static Descriptor<M>>,
    context: Option<M::Context>,
    config: EngineConfig,
    section: Option<Arc<dyn CriticalSection>>,
}

impl<M: Machine> StateMachineBuilder<M> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            descriptor: None,
            context: None,
            config: EngineConfig::default(),
            section: None,
        }
    }

    /// Set the machine descriptor (required).
    pub fn descriptor(mut self, descriptor: &'static Descriptor<M>) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Set the instance context (required).
    pub fn context(mut self, context: M::Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a critical section around external dispatch.
    pub fn critical_section(mut self, section: Arc<dyn CriticalSection>) -> Self {
        self.section = Some(section);
        self
    }

    /// Build the instance in its initial state.
    pub fn build(self) -> Result<StateMachine<M>, BuildError> {
        let descriptor = self.descriptor.ok_or(BuildError::MissingDescriptor)?;

        if let Validation::Failure(errors) = validate(descriptor) {
            return Err(BuildError::InvalidDescriptor {
                machine: descriptor.name(),
                violations: errors.iter().cloned().collect(),
            });
        }

        let initial = <M::State as State>::initial().ok_or(BuildError::NoInitialState)?;
        let context = self.context.ok_or(BuildError::MissingContext)?;
        let section = self
            .section
            .unwrap_or_else(|| Arc::new(NoCriticalSection));

        tracing::debug!(
            machine = descriptor.name(),
            initial = initial.name(),
            "state machine built"
        );

        Ok(StateMachine::from_parts(
            descriptor,
            initial,
            context,
            self.config,
            section,
        ))
    }
}

impl<M: Machine> Default for StateMachineBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}
