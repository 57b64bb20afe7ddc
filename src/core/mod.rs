//! Core state machine types.
//!
//! This module contains the pure, table-level pieces of the engine:
//! - State definitions via the `State` trait
//! - Transition directives and per-event maps
//! - Bounded history of committed transitions
//!
//! Nothing here runs callbacks; that is the engine's job.

mod directive;
mod history;
mod state;

pub use directive::{Directive, Event, ResolveError};
pub use history::{StateHistory, StateTransition};
pub use state::State;
