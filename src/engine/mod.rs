//! State engine.
//!
//! A [`StateMachine`] is one running instance of a machine type. External
//! events enter through [`StateMachine::dispatch`], are resolved against the
//! event's transition map, and are then drained by the basic or extended
//! loop (chosen by the descriptor's table shape) until no internal event is
//! pending. Every call runs to completion before returning.

mod basic;
mod config;
mod context;
mod extended;
mod fault;
mod lock;

pub use config::{ConfigError, EngineConfig, FaultPolicy};
pub use context::Ctx;
pub use fault::{DispatchError, Fault, FaultKind};
pub use lock::{CriticalSection, NoCriticalSection};

use crate::alloc::{Allocator, Payload};
use crate::builder::{BuildError, StateMachineBuilder};
use crate::core::{Directive, Event, State, StateHistory, StateTransition};
use crate::descriptor::{Descriptor, Machine, StateTable};
use chrono::Utc;
use context::{Pending, Slots};
use lock::SectionGuard;
use std::sync::Arc;
use uuid::Uuid;

/// Name used in diagnostics for directives fed in without an event.
const RAW_EVENT: &str = "external";

/// One running machine instance.
pub struct StateMachine<M: Machine> {
    id: Uuid,
    descriptor: &'static Descriptor<M>,
    current: M::State,
    context: M::Context,
    slots: Slots<M>,
    history: StateHistory<M::State>,
    config: EngineConfig,
    section: Arc<dyn CriticalSection>,
    halted: Option<Fault>,
}

impl<M: Machine> StateMachine<M> {
    /// Build an instance with the default config.
    pub fn new(
        descriptor: &'static Descriptor<M>,
        context: M::Context,
    ) -> Result<Self, BuildError> {
        StateMachineBuilder::new()
            .descriptor(descriptor)
            .context(context)
            .build()
    }

    pub fn builder() -> StateMachineBuilder<M> {
        StateMachineBuilder::new()
    }

    pub(crate) fn from_parts(
        descriptor: &'static Descriptor<M>,
        initial: M::State,
        context: M::Context,
        config: EngineConfig,
        section: Arc<dyn CriticalSection>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            descriptor,
            current: initial,
            context,
            slots: Slots::default(),
            history: StateHistory::with_limit(config.history_limit),
            config,
            section,
            halted: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &'static Descriptor<M> {
        self.descriptor
    }

    pub fn current_state(&self) -> M::State {
        self.current
    }

    pub fn context(&self) -> &M::Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut M::Context {
        &mut self.context
    }

    pub fn history(&self) -> &StateHistory<M::State> {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// True while a transition is queued. Always false between dispatches.
    pub fn is_pending(&self) -> bool {
        self.slots.pending.is_some()
    }

    /// The fault that halted this instance, if any.
    pub fn halted(&self) -> Option<&Fault> {
        self.halted.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Dispatch an external event, taking ownership of its payload.
    ///
    /// Returns once the event and every internal event it caused have been
    /// processed. The payload is released exactly once on every path.
    pub fn dispatch(
        &mut self,
        event: &Event<M::State>,
        payload: Option<Payload<M::Data>>,
    ) -> Result<(), DispatchError> {
        let section = Arc::clone(&self.section);
        let _guard = SectionGuard::enter(section.as_ref());
        self.ensure_running()?;

        let expected = self.descriptor.max_states();
        let len = event.map().len();
        let directive = match event.resolve(self.current) {
            Ok(directive) if len == expected => directive,
            _ => {
                return Err(self.fault(FaultKind::TableSize {
                    event: event.name(),
                    len,
                    expected,
                }))
            }
        };

        self.apply(event.name(), directive, payload)
    }

    /// Allocate a payload for `data` and dispatch it.
    ///
    /// On allocation failure nothing is dispatched.
    pub fn dispatch_with(
        &mut self,
        event: &Event<M::State>,
        allocator: &Arc<dyn Allocator>,
        data: M::Data,
    ) -> Result<(), DispatchError> {
        let payload = Payload::new(allocator, data)?;
        self.dispatch(event, Some(payload))
    }

    /// Feed an already-resolved directive into the engine.
    pub fn external_event(
        &mut self,
        directive: Directive<M::State>,
        payload: Option<Payload<M::Data>>,
    ) -> Result<(), DispatchError> {
        let section = Arc::clone(&self.section);
        let _guard = SectionGuard::enter(section.as_ref());
        self.ensure_running()?;
        self.apply(RAW_EVENT, directive, payload)
    }

    fn ensure_running(&self) -> Result<(), DispatchError> {
        match &self.halted {
            Some(fault) => Err(DispatchError::Halted(fault.clone())),
            None => Ok(()),
        }
    }

    fn apply(
        &mut self,
        event: &'static str,
        directive: Directive<M::State>,
        payload: Option<Payload<M::Data>>,
    ) -> Result<(), DispatchError> {
        match directive {
            Directive::Ignored => {
                tracing::trace!(
                    machine = self.name(),
                    instance = %self.id,
                    state = self.current.name(),
                    event,
                    "event ignored"
                );
                drop(payload);
                Ok(())
            }
            Directive::Impossible => {
                drop(payload);
                Err(self.fault(FaultKind::CannotHappen { event }))
            }
            Directive::Transition(target) => {
                self.slots.pending = Some(Pending {
                    target,
                    payload,
                    internal: false,
                });
                let descriptor = self.descriptor;
                match descriptor.table() {
                    StateTable::Basic(entries) => self.run_basic(entries),
                    StateTable::Extended(entries) => self.run_extended(entries),
                }
            }
        }
    }

    fn ctx(&mut self) -> Ctx<'_, M> {
        Ctx::new(
            self.descriptor.name(),
            self.current,
            &mut self.context,
            &mut self.slots,
        )
    }

    fn commit(&mut self, target: M::State, internal: bool) {
        let from = self.current;
        tracing::debug!(
            machine = self.name(),
            instance = %self.id,
            from = from.name(),
            to = target.name(),
            internal,
            "state transition"
        );
        self.current = target;
        self.history.record(StateTransition {
            from,
            to: target,
            timestamp: Utc::now(),
            internal,
        });
    }

    /// Enforce the cascade limit for the `steps`-th drain iteration.
    #[track_caller]
    fn check_depth(&mut self, steps: usize) -> Result<(), DispatchError> {
        match self.config.max_cascade_depth {
            Some(limit) if steps > limit => Err(self.fault(FaultKind::CascadeLimit { limit })),
            _ => Ok(()),
        }
    }

    /// Turn a fault reported through [`Ctx::fault`] into a halt.
    #[track_caller]
    fn check_callback(&mut self) -> Result<(), DispatchError> {
        match self.slots.fault.take() {
            Some(kind) => Err(self.fault(kind)),
            None => Ok(()),
        }
    }

    /// Record a fault, halt the instance and discard queued work.
    #[track_caller]
    fn fault(&mut self, kind: FaultKind) -> DispatchError {
        let fault = Fault::new(self.descriptor.name(), self.id, self.current.name(), kind);
        tracing::error!(
            machine = fault.machine,
            instance = %fault.instance,
            state = fault.state,
            file = fault.file,
            line = fault.line,
            "logic fault: {}",
            fault.kind
        );

        self.slots.pending = None;
        self.slots.fault = None;
        self.halted = Some(fault.clone());

        if self.config.fault_policy == FaultPolicy::Panic {
            panic!("{fault}");
        }
        DispatchError::Fault(fault)
    }

    #[track_caller]
    fn out_of_range(&mut self, index: usize) -> DispatchError {
        let max = self.descriptor.max_states();
        self.fault(FaultKind::StateOutOfRange { index, max })
    }
}

impl<M: Machine> std::fmt::Debug for StateMachine<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("name", &self.descriptor.name())
            .field("current", &self.current)
            .field("pending", &self.is_pending())
            .field("halted", &self.halted)
            .finish()
    }
}
