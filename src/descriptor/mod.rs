//! Machine descriptors.
//!
//! A [`Descriptor`] is the immutable, per-machine-type description the
//! engine runs from: a name, the state count, the state table and the
//! external events defined on the machine. Descriptors are built once, as
//! `static` items, and shared by every instance of that machine type.

mod validate;

pub use validate::{validate, DescriptorViolation};

use crate::core::{Event, State};
use crate::engine::Ctx;

/// Binds the types a machine is made of.
///
/// Implemented on a marker type; the engine is generic over it.
pub trait Machine: Sized + 'static {
    /// The machine's state enum.
    type State: State;

    /// Event data carried by payloads.
    type Data: Send + 'static;

    /// Caller-owned domain data that callbacks read and mutate.
    type Context;
}

/// State behavior, run on every dispatch into the state.
pub type StateFn<M> = fn(&mut Ctx<'_, M>, Option<&<M as Machine>::Data>);

/// Guard predicate; `false` vetoes the transition.
pub type GuardFn<M> = fn(&mut Ctx<'_, M>, Option<&<M as Machine>::Data>) -> bool;

/// Entry action, run once when the state is entered from another state.
pub type EntryFn<M> = fn(&mut Ctx<'_, M>, Option<&<M as Machine>::Data>);

/// Exit action, run once when the state is left for another state.
pub type ExitFn<M> = fn(&mut Ctx<'_, M>);

/// State table entry for machines without guard/entry/exit.
pub struct BasicEntry<M: Machine> {
    pub name: &'static str,
    pub behavior: StateFn<M>,
}

impl<M: Machine> BasicEntry<M> {
    pub const fn new(name: &'static str, behavior: StateFn<M>) -> Self {
        Self { name, behavior }
    }
}

/// State table entry with optional guard, entry and exit actions.
pub struct ExtendedEntry<M: Machine> {
    pub name: &'static str,
    pub behavior: StateFn<M>,
    pub guard: Option<GuardFn<M>>,
    pub entry: Option<EntryFn<M>>,
    pub exit: Option<ExitFn<M>>,
}

impl<M: Machine> ExtendedEntry<M> {
    /// Entry with behavior only.
    pub const fn new(name: &'static str, behavior: StateFn<M>) -> Self {
        Self {
            name,
            behavior,
            guard: None,
            entry: None,
            exit: None,
        }
    }
}

/// The two table shapes. A machine type uses exactly one.
pub enum StateTable<M: Machine> {
    Basic(&'static [BasicEntry<M>]),
    Extended(&'static [ExtendedEntry<M>]),
}

impl<M: Machine> StateTable<M> {
    pub fn len(&self) -> usize {
        match self {
            Self::Basic(entries) => entries.len(),
            Self::Extended(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_extended(&self) -> bool {
        matches!(self, Self::Extended(_))
    }

    /// Diagnostic name of the entry at `index`.
    pub fn entry_name(&self, index: usize) -> Option<&'static str> {
        match self {
            Self::Basic(entries) => entries.get(index).map(|entry| entry.name),
            Self::Extended(entries) => entries.get(index).map(|entry| entry.name),
        }
    }
}

/// Immutable per-machine-type metadata.
pub struct Descriptor<M: Machine> {
    name: &'static str,
    max_states: usize,
    table: StateTable<M>,
    events: &'static [&'static Event<M::State>],
}

impl<M: Machine> Descriptor<M> {
    pub const fn basic(
        name: &'static str,
        max_states: usize,
        table: &'static [BasicEntry<M>],
        events: &'static [&'static Event<M::State>],
    ) -> Self {
        Self {
            name,
            max_states,
            table: StateTable::Basic(table),
            events,
        }
    }

    pub const fn extended(
        name: &'static str,
        max_states: usize,
        table: &'static [ExtendedEntry<M>],
        events: &'static [&'static Event<M::State>],
    ) -> Self {
        Self {
            name,
            max_states,
            table: StateTable::Extended(table),
            events,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_states(&self) -> usize {
        self.max_states
    }

    pub fn table(&self) -> &StateTable<M> {
        &self.table
    }

    /// External events registered for validation.
    pub fn events(&self) -> &'static [&'static Event<M::State>] {
        self.events
    }
}
