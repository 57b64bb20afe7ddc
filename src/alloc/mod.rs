//! Event payload ownership.
//!
//! The engine never allocates on its own. Callers build a [`Payload`] from
//! any [`Allocator`]; the payload then travels by value into a dispatch call
//! and is released back to its allocator exactly once, when the engine drops
//! it after the consuming callback has returned.

mod heap;
mod pool;

pub use heap::HeapAllocator;
pub use pool::{BlockPool, PoolTier};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// Handle to one allocated block.
///
/// Blocks are not `Clone`: a block can be handed back to its allocator once.
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    tier: usize,
    slot: usize,
    size: usize,
}

impl Block {
    pub fn new(tier: usize, slot: usize, size: usize) -> Self {
        Self { tier, slot, size }
    }

    pub fn tier(&self) -> usize {
        self.tier
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Requested size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Errors returned by an allocator.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AllocError {
    #[error("no free block for a {size} byte request")]
    Exhausted { size: usize },

    #[error("{size} byte request exceeds the largest block ({max} bytes)")]
    TooLarge { size: usize, max: usize },
}

/// Counters kept by the bundled allocators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocStats {
    pub allocations: u64,
    pub releases: u64,
    pub failures: u64,
}

impl AllocStats {
    /// Blocks allocated but not yet released.
    pub fn in_use(&self) -> u64 {
        self.allocations.saturating_sub(self.releases)
    }
}

/// Allocate/release capability consumed by payloads.
///
/// `release` must be safe to call exactly once per successful `allocate`.
pub trait Allocator: Send + Sync {
    fn allocate(&self, size: usize) -> Result<Block, AllocError>;

    fn release(&self, block: Block);
}

/// Single-owner event data backed by an allocator block.
///
/// Dropping the payload releases the block.
///
/// ```rust
/// use fsm_kernel::alloc::{Allocator, HeapAllocator, Payload};
/// use std::sync::Arc;
///
/// let heap = Arc::new(HeapAllocator::new());
/// let allocator: Arc<dyn Allocator> = heap.clone();
///
/// let payload = Payload::new(&allocator, 42u32).unwrap();
/// assert_eq!(*payload, 42);
/// assert_eq!(heap.stats().in_use(), 1);
///
/// drop(payload);
/// assert_eq!(heap.stats().in_use(), 0);
/// ```
pub struct Payload<D> {
    value: D,
    block: Option<Block>,
    allocator: Arc<dyn Allocator>,
}

impl<D> Payload<D> {
    /// Allocate a block sized for `D` and move `value` into the payload.
    pub fn new(allocator: &Arc<dyn Allocator>, value: D) -> Result<Self, AllocError> {
        let block = allocator.allocate(std::mem::size_of::<D>())?;
        Ok(Self {
            value,
            block: Some(block),
            allocator: Arc::clone(allocator),
        })
    }

    pub fn get(&self) -> &D {
        &self.value
    }

    pub fn block(&self) -> Option<&Block> {
        self.block.as_ref()
    }
}

impl<D> Deref for Payload<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.value
    }
}

impl<D> Drop for Payload<D> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            tracing::trace!(size = block.size(), "releasing event payload");
            self.allocator.release(block);
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Payload<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("value", &self.value)
            .field("block", &self.block)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Reading {
        rpm: i32,
    }

    #[test]
    fn payload_releases_on_drop() {
        let heap = Arc::new(HeapAllocator::new());
        let allocator: Arc<dyn Allocator> = heap.clone();

        let payload = Payload::new(&allocator, Reading { rpm: 1200 }).unwrap();
        assert_eq!(payload.rpm, 1200);
        assert_eq!(payload.get().rpm, 1200);
        assert_eq!(heap.stats().allocations, 1);
        assert_eq!(heap.stats().releases, 0);

        drop(payload);
        assert_eq!(heap.stats().releases, 1);
    }

    #[test]
    fn allocation_failure_is_returned() {
        let pool = Arc::new(BlockPool::new(&[PoolTier::new(4, 1)]));
        let allocator: Arc<dyn Allocator> = pool.clone();

        let result = Payload::new(&allocator, [0u8; 16]);
        assert_eq!(
            result.err(),
            Some(AllocError::TooLarge { size: 16, max: 4 })
        );
        assert_eq!(pool.stats().in_use(), 0);
    }

    #[test]
    fn payload_block_records_size() {
        let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
        let payload = Payload::new(&allocator, 7u64).unwrap();
        assert_eq!(payload.block().map(Block::size), Some(8));
    }

    #[test]
    fn in_use_never_underflows() {
        let stats = AllocStats {
            allocations: 1,
            releases: 2,
            failures: 0,
        };
        assert_eq!(stats.in_use(), 0);
    }
}
