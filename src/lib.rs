//! fsm-kernel: a table-driven finite state machine engine
//!
//! Machines are declared as static data: a state enum, one transition map
//! per external event, and a state table holding each state's behavior and,
//! for extended machines, its optional guard, entry and exit actions. The
//! engine resolves events against those tables and runs the callbacks,
//! draining internal events until the machine settles.
//!
//! # Core Concepts
//!
//! - **State**: index-addressable state enums via the `State` trait
//! - **Directive**: per-state outcome of an event (ignore, impossible, go to)
//! - **Descriptor**: immutable per-machine-type tables, shared by instances
//! - **Payload**: single-owner event data released exactly once
//! - **Faults**: table defects halt the offending instance loudly
//!
//! # Example
//!
//! ```rust
//! use fsm_kernel::core::{Directive, Event, State};
//! use fsm_kernel::descriptor::{BasicEntry, Descriptor, Machine};
//! use fsm_kernel::engine::{Ctx, StateMachine};
//! use fsm_kernel::state_enum;
//!
//! state_enum! {
//!     pub enum Door {
//!         Closed,
//!         Open,
//!     }
//! }
//!
//! struct DoorMachine;
//!
//! impl Machine for DoorMachine {
//!     type State = Door;
//!     type Data = ();
//!     type Context = u32;
//! }
//!
//! fn closed(_ctx: &mut Ctx<'_, DoorMachine>, _data: Option<&()>) {}
//!
//! fn open(ctx: &mut Ctx<'_, DoorMachine>, _data: Option<&()>) {
//!     *ctx.context_mut() += 1;
//! }
//!
//! static STATES: [BasicEntry<DoorMachine>; <Door as State>::COUNT] = [
//!     BasicEntry::new("Closed", closed),
//!     BasicEntry::new("Open", open),
//! ];
//!
//! const PUSH_MAP: [Directive<Door>; <Door as State>::COUNT] = [
//!     Directive::Transition(Door::Open), // Closed
//!     Directive::Ignored,                // Open
//! ];
//!
//! static PUSH: Event<Door> = Event::new("Push", &PUSH_MAP);
//! static EVENTS: [&Event<Door>; 1] = [&PUSH];
//! static DOOR: Descriptor<DoorMachine> =
//!     Descriptor::basic("Door", <Door as State>::COUNT, &STATES, &EVENTS);
//!
//! let mut door = StateMachine::new(&DOOR, 0).unwrap();
//! door.dispatch(&PUSH, None).unwrap();
//! door.dispatch(&PUSH, None).unwrap();
//!
//! assert_eq!(door.current_state(), Door::Open);
//! assert_eq!(*door.context(), 1);
//! ```

pub mod alloc;
pub mod builder;
pub mod core;
pub mod descriptor;
pub mod engine;
pub mod machines;

// Re-export commonly used types
pub use crate::alloc::{Allocator, Payload};
pub use crate::builder::{BuildError, StateMachineBuilder};
pub use crate::core::{Directive, Event, State, StateHistory, StateTransition};
pub use crate::descriptor::{Descriptor, Machine};
pub use crate::engine::{Ctx, DispatchError, EngineConfig, Fault, FaultKind, StateMachine};
