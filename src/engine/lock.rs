//! Critical-section hook around external dispatch.
//!
//! The engine holds no lock. Callers that drive one instance from several
//! execution contexts install a [`CriticalSection`] to serialize external
//! events; `enter` runs before the event is resolved and `leave` after the
//! dispatch finishes, on every path.

/// Caller-supplied serialization around one external event.
pub trait CriticalSection: Send + Sync {
    fn enter(&self);

    fn leave(&self);
}

/// Does nothing; the default for single-context use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCriticalSection;

impl CriticalSection for NoCriticalSection {
    fn enter(&self) {}

    fn leave(&self) {}
}

/// Calls `leave` when dropped.
pub(crate) struct SectionGuard<'a> {
    section: &'a dyn CriticalSection,
}

impl<'a> SectionGuard<'a> {
    pub(crate) fn enter(section: &'a dyn CriticalSection) -> Self {
        section.enter();
        Self { section }
    }
}

impl Drop for SectionGuard<'_> {
    fn drop(&mut self) {
        self.section.leave();
    }
}
