//! Block allocator collaborator, supplied by the caller. This module only
//! defines the trait the FTL consumes and a deterministic test double.

use crate::address::{Address, AddressValidity};
use crate::config::Geometry;

/// Which append-only pool a fresh block is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPool {
    Data,
    Log,
}

/// External collaborator that hands the FTL a fresh, erased block.
pub trait BlockAllocator {
    /// Returns the base page address of a freshly erased block from `pool`.
    fn get_free_block(&mut self, pool: BlockPool) -> Address;
}

/// A deterministic allocator that hands out successive blocks in linear
/// order, for standalone testing of the FTL. Not a claim about how a real
/// allocator picks blocks (wear-leveling, erase counts, etc. are entirely
/// its own concern) — see DESIGN.md.
#[derive(Debug, Clone)]
pub struct LinearBlockAllocator {
    geometry: Geometry,
    next_data_block: u64,
    next_log_block: u64,
}

impl LinearBlockAllocator {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry, next_data_block: 0, next_log_block: 0 }
    }
}

impl BlockAllocator for LinearBlockAllocator {
    fn get_free_block(&mut self, pool: BlockPool) -> Address {
        let cursor = match pool {
            BlockPool::Data => &mut self.next_data_block,
            BlockPool::Log => &mut self.next_log_block,
        };
        let block_base_linear = *cursor * self.geometry.block_size;
        *cursor += 1;
        let mut address = Address::from_linear(block_base_linear, &self.geometry);
        address.valid = AddressValidity::Block;
        address
    }
}
