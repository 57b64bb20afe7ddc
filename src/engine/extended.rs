//! Drain loop for machines with guard, entry and exit actions.
//!
//! Per transition attempt:
//! 1. the target's guard runs (absent = pass); a veto skips steps 2-4
//! 2. on a real state change, the active state's exit, then the target's entry
//! 3. `current` is set to the target, even for a self-transition
//! 4. the target's behavior runs
//!
//! The payload is released after each attempt whatever the guard said.

use super::{DispatchError, FaultKind, StateMachine};
use crate::core::State;
use crate::descriptor::{ExtendedEntry, Machine};

impl<M: Machine> StateMachine<M> {
    pub(super) fn run_extended(
        &mut self,
        entries: &[ExtendedEntry<M>],
    ) -> Result<(), DispatchError> {
        let max = self.descriptor.max_states();
        let mut steps = 0;

        while let Some(pending) = self.slots.pending.take() {
            steps += 1;
            self.check_depth(steps)?;

            let target = pending.target;
            let index = target.index();
            let Some(entry) = entries.get(index).filter(|_| index < max) else {
                return Err(self.out_of_range(index));
            };
            let active_index = self.current.index();
            let Some(active) = entries.get(active_index) else {
                return Err(self.out_of_range(active_index));
            };

            let data = pending.payload.as_deref();

            let allowed = match entry.guard {
                Some(guard) => {
                    let allowed = guard(&mut self.ctx(), data);
                    self.check_callback()?;
                    allowed
                }
                None => true,
            };

            if allowed {
                if target != self.current {
                    let raised = self.slots.raised;

                    if let Some(exit) = active.exit {
                        exit(&mut self.ctx());
                        self.check_callback()?;
                    }
                    if let Some(on_entry) = entry.entry {
                        on_entry(&mut self.ctx(), data);
                        self.check_callback()?;
                    }

                    if self.slots.raised != raised {
                        return Err(self.fault(FaultKind::RaisedFromEntryExit {
                            state: target.name(),
                        }));
                    }
                }

                self.commit(target, pending.internal);
                (entry.behavior)(&mut self.ctx(), data);
                self.check_callback()?;
            } else {
                tracing::debug!(
                    machine = self.name(),
                    instance = %self.id,
                    state = self.current.name(),
                    target = target.name(),
                    "guard vetoed transition"
                );
            }

            drop(pending);
        }

        Ok(())
    }
}
