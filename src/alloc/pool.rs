//! Fixed-block pool allocator.
//!
//! Blocks come in size tiers. A request is served by the smallest tier whose
//! block size fits and which still has a free block; when a tier is
//! exhausted the request falls through to the next larger tier.

use super::{AllocError, AllocStats, Allocator, Block};
use std::sync::Mutex;

/// One size class of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTier {
    pub block_size: usize,
    pub blocks: usize,
}

impl PoolTier {
    pub const fn new(block_size: usize, blocks: usize) -> Self {
        Self { block_size, blocks }
    }
}

#[derive(Debug)]
struct TierSlots {
    block_size: usize,
    free: Vec<usize>,
    taken: Vec<bool>,
}

#[derive(Debug)]
struct PoolInner {
    tiers: Vec<TierSlots>,
    stats: AllocStats,
}

/// Pool of fixed-size blocks.
#[derive(Debug)]
pub struct BlockPool {
    inner: Mutex<PoolInner>,
}

impl BlockPool {
    /// Ten 32-byte blocks and five 128-byte blocks.
    pub const STANDARD: [PoolTier; 2] = [PoolTier::new(32, 10), PoolTier::new(128, 5)];

    /// Build a pool; tiers are sorted by block size.
    pub fn new(tiers: &[PoolTier]) -> Self {
        let mut tiers = tiers.to_vec();
        tiers.sort_by_key(|tier| tier.block_size);

        let tiers = tiers
            .into_iter()
            .map(|tier| TierSlots {
                block_size: tier.block_size,
                // Reversed so slot 0 is handed out first.
                free: (0..tier.blocks).rev().collect(),
                taken: vec![false; tier.blocks],
            })
            .collect();

        Self {
            inner: Mutex::new(PoolInner {
                tiers,
                stats: AllocStats::default(),
            }),
        }
    }

    pub fn standard() -> Self {
        Self::new(&Self::STANDARD)
    }

    pub fn stats(&self) -> AllocStats {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).stats
    }

    /// Free blocks remaining in each tier, smallest tier first.
    pub fn free_blocks(&self) -> Vec<usize> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.tiers.iter().map(|tier| tier.free.len()).collect()
    }
}

impl Allocator for BlockPool {
    fn allocate(&self, size: usize) -> Result<Block, AllocError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        let max = inner
            .tiers
            .iter()
            .map(|tier| tier.block_size)
            .max()
            .unwrap_or(0);
        if size > max {
            inner.stats.failures += 1;
            return Err(AllocError::TooLarge { size, max });
        }

        let found = inner
            .tiers
            .iter_mut()
            .enumerate()
            .filter(|(_, tier)| tier.block_size >= size)
            .find_map(|(index, tier)| {
                let slot = tier.free.pop()?;
                tier.taken[slot] = true;
                Some(Block::new(index, slot, size))
            });

        match found {
            Some(block) => {
                inner.stats.allocations += 1;
                Ok(block)
            }
            None => {
                inner.stats.failures += 1;
                tracing::warn!(size, "block pool exhausted");
                Err(AllocError::Exhausted { size })
            }
        }
    }

    fn release(&self, block: Block) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        let Some(tier) = inner.tiers.get_mut(block.tier()) else {
            tracing::error!(tier = block.tier(), "release of block from unknown tier");
            return;
        };
        match tier.taken.get_mut(block.slot()) {
            Some(taken) if *taken => {
                *taken = false;
                tier.free.push(block.slot());
                inner.stats.releases += 1;
            }
            _ => {
                tracing::error!(
                    tier = block.tier(),
                    slot = block.slot(),
                    "release of block that is not allocated"
                );
            }
        }
    }
}
