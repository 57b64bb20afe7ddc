//! State transition history tracking.
//!
//! Every time the engine commits a state (including self-transitions) it
//! records a [`StateTransition`]. The history is bounded: once `limit`
//! entries are held, the oldest is dropped.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
    /// Whether the transition was requested from inside a callback
    pub internal: bool,
}

/// Bounded, ordered history of committed transitions.
///
/// # Example
///
/// ```rust
/// use fsm_kernel::core::{StateHistory, StateTransition};
/// use fsm_kernel::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Phase { One, Two, Three }
/// }
///
/// let mut history = StateHistory::with_limit(8);
/// history.record(StateTransition {
///     from: Phase::One,
///     to: Phase::Two,
///     timestamp: Utc::now(),
///     internal: false,
/// });
/// history.record(StateTransition {
///     from: Phase::Two,
///     to: Phase::Three,
///     timestamp: Utc::now(),
///     internal: true,
/// });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&Phase::One, &Phase::Two, &Phase::Three]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
    limit: usize,
}

impl<S: State> StateHistory<S> {
    /// Create an empty history holding at most `limit` transitions.
    ///
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Record a transition, evicting the oldest ones when full.
    ///
    /// A history deserialized with more entries than its limit is trimmed
    /// back to the limit on the next record.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.limit == 0 {
            self.transitions.clear();
            return;
        }
        while self.transitions.len() >= self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained transition, then the
    /// `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Duration from the oldest to the newest retained transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Retained transitions, oldest first.
    pub fn transitions(&self) -> impl DoubleEndedIterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
