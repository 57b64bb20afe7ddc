//! Unbounded allocator that only keeps counters.

use super::{AllocError, AllocStats, Allocator, Block};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct HeapInner {
    next_slot: usize,
    live: HashSet<usize>,
    stats: AllocStats,
}

/// Heap-style allocator: never fails, counts traffic.
#[derive(Debug, Default)]
pub struct HeapAllocator {
    inner: Mutex<HeapInner>,
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AllocStats {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).stats
    }
}

impl Allocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Result<Block, AllocError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let slot = inner.next_slot;
        inner.next_slot += 1;
        inner.live.insert(slot);
        inner.stats.allocations += 1;
        Ok(Block::new(0, slot, size))
    }

    fn release(&self, block: Block) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if block.tier() != 0 || !inner.live.remove(&block.slot()) {
            tracing::error!(
                tier = block.tier(),
                slot = block.slot(),
                "release of block that is not allocated"
            );
            return;
        }
        inner.stats.releases += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_allocations_and_releases() {
        let heap = HeapAllocator::new();
        let a = heap.allocate(12).unwrap();
        let b = heap.allocate(0).unwrap();
        assert_ne!(a.slot(), b.slot());

        heap.release(a);
        let stats = heap.stats();
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.in_use(), 1);

        heap.release(b);
        assert_eq!(heap.stats().in_use(), 0);
    }

    #[test]
    fn foreign_block_release_is_ignored() {
        let heap = HeapAllocator::new();
        heap.release(Block::new(0, 0, 4));
        assert_eq!(heap.stats().releases, 0);
        assert_eq!(heap.stats().in_use(), 0);

        let block = heap.allocate(4).unwrap();
        heap.release(Block::new(0, block.slot(), 4));
        heap.release(Block::new(0, block.slot(), 4));
        assert_eq!(heap.stats().releases, 1);
        assert_eq!(heap.stats().in_use(), 0);
        drop(block);
    }
}
