//! Core State trait for table-driven state machines.
//!
//! States are plain indices into a machine's state table. The trait gives
//! every state enum a stable index, a display name and the ordered list of
//! all its variants, so tables can be sized and checked against it.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// A state is a fieldless value whose `index()` is its position in the
/// machine's state table. Index 0 is the initial state.
///
/// # Required Traits
///
/// - `Copy` + `Eq`: states are compared on every transition attempt
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states appear in serializable history
///
/// Most implementations are generated by [`state_enum!`](crate::state_enum).
///
/// # Example
///
/// ```rust
/// use fsm_kernel::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Valve {
///     Closed,
///     Open,
///     Jammed,
/// }
///
/// impl State for Valve {
///     const ALL: &'static [Self] = &[Self::Closed, Self::Open, Self::Jammed];
///
///     fn index(self) -> usize {
///         self as usize
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Open => "Open",
///             Self::Jammed => "Jammed",
///         }
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Jammed)
///     }
/// }
///
/// assert_eq!(Valve::COUNT, 3);
/// assert_eq!(Valve::from_index(1), Some(Valve::Open));
/// assert_eq!(Valve::initial(), Some(Valve::Closed));
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Every state, ordered by index.
    const ALL: &'static [Self];

    /// Number of valid state indices.
    const COUNT: usize = Self::ALL.len();

    /// Position of this state in the state table.
    fn index(self) -> usize;

    /// Get the state's name for display/logging.
    fn name(&self) -> &'static str;

    /// Look a state up by its table index.
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The initial state (index 0), if the machine has any states.
    fn initial() -> Option<Self> {
        Self::from_index(0)
    }

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
        Failed,
    }

    impl State for TestState {
        const ALL: &'static [Self] = &[
            Self::Initial,
            Self::Processing,
            Self::Complete,
            Self::Failed,
        ];

        fn index(self) -> usize {
            self as usize
        }

        fn name(&self) -> &'static str {
            match self {
                Self::Initial => "Initial",
                Self::Processing => "Processing",
                Self::Complete => "Complete",
                Self::Failed => "Failed",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Complete | Self::Failed)
        }

        fn is_error(&self) -> bool {
            matches!(self, Self::Failed)
        }
    }

    #[test]
    fn count_matches_variants() {
        assert_eq!(TestState::COUNT, 4);
    }

    #[test]
    fn index_and_from_index_agree() {
        for state in TestState::ALL {
            assert_eq!(TestState::from_index(state.index()), Some(*state));
        }
        assert_eq!(TestState::from_index(4), None);
    }

    #[test]
    fn initial_is_index_zero() {
        assert_eq!(TestState::initial(), Some(TestState::Initial));
    }

    #[test]
    fn is_final_identifies_terminal_states() {
        assert!(!TestState::Initial.is_final());
        assert!(!TestState::Processing.is_final());
        assert!(TestState::Complete.is_final());
        assert!(TestState::Failed.is_final());
    }

    #[test]
    fn is_error_identifies_error_states() {
        assert!(!TestState::Complete.is_error());
        assert!(TestState::Failed.is_error());
    }

    #[test]
    fn state_serializes_correctly() {
        let state = TestState::Processing;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
