//! The handle callbacks receive.

use super::fault::FaultKind;
use crate::alloc::Payload;
use crate::core::State;
use crate::descriptor::Machine;

/// A transition requested while an event is being processed.
pub(crate) struct Pending<M: Machine> {
    pub(crate) target: M::State,
    pub(crate) payload: Option<Payload<M::Data>>,
    pub(crate) internal: bool,
}

/// Mutable engine slots a callback may touch.
pub(crate) struct Slots<M: Machine> {
    pub(crate) pending: Option<Pending<M>>,
    /// Count of internal events raised so far; compared around entry/exit.
    pub(crate) raised: u64,
    pub(crate) fault: Option<FaultKind>,
}

impl<M: Machine> Default for Slots<M> {
    fn default() -> Self {
        Self {
            pending: None,
            raised: 0,
            fault: None,
        }
    }
}

/// Passed to every state, guard, entry and exit callback.
///
/// Gives access to the instance's context and the internal-event primitive.
pub struct Ctx<'a, M: Machine> {
    machine: &'static str,
    state: M::State,
    context: &'a mut M::Context,
    slots: &'a mut Slots<M>,
}

impl<'a, M: Machine> Ctx<'a, M> {
    pub(crate) fn new(
        machine: &'static str,
        state: M::State,
        context: &'a mut M::Context,
        slots: &'a mut Slots<M>,
    ) -> Self {
        Self {
            machine,
            state,
            context,
            slots,
        }
    }

    pub fn machine_name(&self) -> &'static str {
        self.machine
    }

    /// The active state. During guard, exit and entry this is still the
    /// state being left.
    pub fn state(&self) -> M::State {
        self.state
    }

    pub fn context(&self) -> &M::Context {
        self.context
    }

    pub fn context_mut(&mut self) -> &mut M::Context {
        self.context
    }

    /// Raise an internal event. The engine processes it as soon as the
    /// current callback returns, before the external dispatch completes.
    ///
    /// Must not be called from entry or exit actions.
    pub fn raise(&mut self, target: M::State, payload: Option<Payload<M::Data>>) {
        self.slots.raised += 1;
        let replaced = self.slots.pending.replace(Pending {
            target,
            payload,
            internal: true,
        });
        if let Some(previous) = replaced {
            tracing::warn!(
                machine = self.machine,
                dropped = previous.target.name(),
                target = target.name(),
                "internal event replaced an earlier request"
            );
        }
    }

    /// Report a logic fault from inside a callback, e.g. a missing required
    /// payload. The engine halts the instance once the callback returns.
    pub fn fault(&mut self, reason: &'static str) {
        if self.slots.fault.is_none() {
            self.slots.fault = Some(FaultKind::Behavior { reason });
        }
    }
}
