//! Transition directives and per-event transition maps.
//!
//! Every external event owns a static map with one [`Directive`] per state.
//! Resolving an event is a plain lookup by the current state's index; the
//! policy of which states accept which events lives entirely in the map.

use super::state::State;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of looking up (current state, event) in a transition map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Directive<S> {
    /// Drop the event and release its payload.
    Ignored,

    /// The event must never arrive in this state. Reaching it is a logic fault.
    Impossible,

    /// Move to the given state.
    Transition(S),
}

impl<S: State> Directive<S> {
    /// Target state, if this directive names one.
    pub fn target(&self) -> Option<S> {
        match self {
            Self::Transition(state) => Some(*state),
            Self::Ignored | Self::Impossible => None,
        }
    }
}

/// A named external event and its transition map.
///
/// Declare the map as a constant sized by the state count so that a map of
/// the wrong length fails to compile:
///
/// ```rust
/// use fsm_kernel::core::{Directive, Event, State};
/// use fsm_kernel::state_enum;
///
/// state_enum! {
///     pub enum Lamp {
///         Off,
///         On,
///     }
/// }
///
/// const TOGGLE_MAP: [Directive<Lamp>; <Lamp as State>::COUNT] = [
///     Directive::Transition(Lamp::On),  // Off
///     Directive::Transition(Lamp::Off), // On
/// ];
///
/// static TOGGLE: Event<Lamp> = Event::new("Toggle", &TOGGLE_MAP);
///
/// assert_eq!(TOGGLE.resolve(Lamp::Off), Ok(Directive::Transition(Lamp::On)));
/// ```
#[derive(Debug)]
pub struct Event<S: 'static> {
    name: &'static str,
    map: &'static [Directive<S>],
}

impl<S: State> Event<S> {
    pub const fn new(name: &'static str, map: &'static [Directive<S>]) -> Self {
        Self { name, map }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The raw map, indexed by state.
    pub fn map(&self) -> &'static [Directive<S>] {
        self.map
    }

    /// Resolve the directive for `current`.
    ///
    /// Pure lookup. `Impossible` is returned as-is so the engine can fault
    /// on it; a map shorter than the state's index is reported as an error.
    pub fn resolve(&self, current: S) -> Result<Directive<S>, ResolveError> {
        self.map
            .get(current.index())
            .copied()
            .ok_or(ResolveError::MapTooShort {
                event: self.name,
                len: self.map.len(),
                index: current.index(),
            })
    }
}

/// Lookup failure for a transition map that does not cover every state.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("transition map for '{event}' has {len} entries, no entry for state index {index}")]
    MapTooShort {
        event: &'static str,
        len: usize,
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::state_enum! {
        enum Door {
            Closed,
            Open,
            Locked,
        }
    }

    const OPEN_MAP: [Directive<Door>; <Door as State>::COUNT] = [
        Directive::Transition(Door::Open), // Closed
        Directive::Ignored,                // Open
        Directive::Impossible,             // Locked
    ];

    static OPEN: Event<Door> = Event::new("Open", &OPEN_MAP);
    static SHORT: Event<Door> = Event::new("Short", &[Directive::Ignored]);

    #[test]
    fn resolve_looks_up_current_state() {
        assert_eq!(
            OPEN.resolve(Door::Closed),
            Ok(Directive::Transition(Door::Open))
        );
        assert_eq!(OPEN.resolve(Door::Open), Ok(Directive::Ignored));
    }

    #[test]
    fn resolve_surfaces_impossible() {
        assert_eq!(OPEN.resolve(Door::Locked), Ok(Directive::Impossible));
    }

    #[test]
    fn resolve_reports_short_map() {
        assert_eq!(SHORT.resolve(Door::Closed), Ok(Directive::Ignored));
        assert_eq!(
            SHORT.resolve(Door::Locked),
            Err(ResolveError::MapTooShort {
                event: "Short",
                len: 1,
                index: 2,
            })
        );
    }

    #[test]
    fn target_only_for_transitions() {
        assert_eq!(Directive::Transition(Door::Open).target(), Some(Door::Open));
        assert_eq!(Directive::<Door>::Ignored.target(), None);
        assert_eq!(Directive::<Door>::Impossible.target(), None);
    }
}
