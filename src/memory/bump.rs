/*!
 * Bump Heap
 * Allocator that never reclaims memory
 */

use super::region::MemoryRegion;
use super::traits::{Allocator, HeapAccess, MemoryInfo, SimulatedHeap};
use super::types::{MemoryError, MemoryResult, MemoryStats};
use crate::core::types::{Address, Size};
use log::{debug, warn};

/// Hands out consecutive byte ranges until the region is exhausted
#[derive(Debug, Clone)]
pub struct BumpHeap {
    region: MemoryRegion,
    next: Address,
}

impl BumpHeap {
    pub fn new(size: Size) -> MemoryResult<Self> {
        Ok(Self {
            region: MemoryRegion::new(size)?,
            next: 0,
        })
    }

    pub fn alloc(&mut self, size: Size) -> MemoryResult<Address> {
        if size == 0 {
            return Err(MemoryError::invalid_size(
                size,
                "allocation requests must be at least one byte",
            ));
        }

        let remaining = self.region.len() - self.next;
        if size >= remaining {
            let stats = self.region.stats();
            warn!(
                "OOM: requested {} bytes, only {} bytes left to bump ({} used / {} total)",
                size, remaining, stats.used, stats.total
            );
            return Err(MemoryError::OutOfMemory {
                requested: size,
                available: remaining,
                used: stats.used,
                total: stats.total,
            });
        }

        let address = self.next;
        self.next += size;
        self.region.charge(size);
        debug!("Bumped {} bytes at 0x{:x}", size, address);
        Ok(address)
    }

    /// Not supported: bump allocations live as long as the heap
    pub fn free(&mut self, _address: Address) -> MemoryResult<()> {
        Ok(())
    }
}

impl Allocator for BumpHeap {
    fn alloc(&mut self, size: Size) -> MemoryResult<Address> {
        BumpHeap::alloc(self, size)
    }

    fn free(&mut self, address: Address) -> MemoryResult<()> {
        BumpHeap::free(self, address)
    }
}

impl HeapAccess for BumpHeap {
    fn region(&self) -> &MemoryRegion {
        &self.region
    }

    fn region_mut(&mut self) -> &mut MemoryRegion {
        &mut self.region
    }
}

impl MemoryInfo for BumpHeap {
    fn stats(&self) -> MemoryStats {
        self.region.stats()
    }
}

impl SimulatedHeap for BumpHeap {}
