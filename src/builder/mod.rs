//! Builder API for ergonomic state machine construction.
//!
//! This module provides a fluent builder for machine instances and the
//! `state_enum!` macro for declaring state enums.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
