//! Drain loop for machines with a basic state table.

use super::{DispatchError, StateMachine};
use crate::core::State;
use crate::descriptor::{BasicEntry, Machine};

impl<M: Machine> StateMachine<M> {
    /// Run pending transitions until a behavior finishes without raising
    /// another internal event.
    pub(super) fn run_basic(&mut self, entries: &[BasicEntry<M>]) -> Result<(), DispatchError> {
        let max = self.descriptor.max_states();
        let mut steps = 0;

        while let Some(pending) = self.slots.pending.take() {
            steps += 1;
            self.check_depth(steps)?;

            let index = pending.target.index();
            let Some(entry) = entries.get(index).filter(|_| index < max) else {
                return Err(self.out_of_range(index));
            };

            self.commit(pending.target, pending.internal);

            let data = pending.payload.as_deref();
            (entry.behavior)(&mut self.ctx(), data);
            self.check_callback()?;

            // Payload released here, before the next pending transition runs.
            drop(pending);
        }

        Ok(())
    }
}
