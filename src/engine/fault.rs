//! Logic faults and dispatch errors.
//!
//! A fault means a machine's declared tables or callbacks are wrong. It is
//! never a runtime condition to recover from: the instance that hit it is
//! halted for good.

use crate::alloc::AllocError;
use std::fmt;
use std::panic::Location;
use thiserror::Error;
use uuid::Uuid;

/// What went wrong.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FaultKind {
    #[error("event '{event}' cannot happen in this state")]
    CannotHappen { event: &'static str },

    #[error("state index {index} is out of range (max {max})")]
    StateOutOfRange { index: usize, max: usize },

    #[error("transition map for '{event}' has {len} entries, expected {expected}")]
    TableSize {
        event: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("entry/exit action on the way to '{state}' raised an internal event")]
    RaisedFromEntryExit { state: &'static str },

    #[error("internal event cascade exceeded {limit} steps")]
    CascadeLimit { limit: usize },

    #[error("callback fault: {reason}")]
    Behavior { reason: &'static str },
}

/// A logic fault with enough context to find the defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub machine: &'static str,
    pub instance: Uuid,
    /// Name of the active state when the fault was raised.
    pub state: &'static str,
    pub kind: FaultKind,
    pub file: &'static str,
    pub line: u32,
}

impl Fault {
    #[track_caller]
    pub(crate) fn new(
        machine: &'static str,
        instance: Uuid,
        state: &'static str,
        kind: FaultKind,
    ) -> Self {
        let site = Location::caller();
        Self {
            machine,
            instance,
            state,
            kind,
            file: site.file(),
            line: site.line(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] in state {}: {} ({}:{})",
            self.machine, self.instance, self.state, self.kind, self.file, self.line
        )
    }
}

impl std::error::Error for Fault {}

/// Errors returned from a dispatch call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("logic fault: {0}")]
    Fault(Fault),

    #[error("machine halted by earlier fault: {0}")]
    Halted(Fault),

    #[error("payload allocation failed: {0}")]
    Allocation(#[from] AllocError),
}

impl DispatchError {
    /// The fault behind this error, if any.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Fault(fault) | Self::Halted(fault) => Some(fault),
            Self::Allocation(_) => None,
        }
    }
}
