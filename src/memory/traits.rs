/*!
 * Memory Traits
 * Seams shared by the bump, free-list and collected heaps
 */

use super::gc::GcStats;
use super::region::MemoryRegion;
use super::types::*;
use crate::core::types::{Address, Size, Word};

/// Memory allocator interface
pub trait Allocator {
    /// Allocate `size` bytes and return the address of the first one
    fn alloc(&mut self, size: Size) -> MemoryResult<Address>;

    /// Release an allocation; heaps that cannot free accept and ignore it
    fn free(&mut self, address: Address) -> MemoryResult<()>;

    /// Whether `free` actually returns memory to the heap
    fn reclaims_on_free(&self) -> bool {
        false
    }
}

/// Raw access to the simulated region
pub trait HeapAccess {
    fn region(&self) -> &MemoryRegion;

    fn region_mut(&mut self) -> &mut MemoryRegion;

    fn read(&self, address: Address) -> MemoryResult<u8> {
        self.region().read(address)
    }

    fn write(&mut self, address: Address, value: u8) -> MemoryResult<()> {
        self.region_mut().write(address, value)
    }

    fn read32(&self, address: Address) -> MemoryResult<Word> {
        self.region().read32(address)
    }

    fn write32(&mut self, address: Address, value: Word) -> MemoryResult<()> {
        self.region_mut().write32(address, value)
    }

    /// Hex/ASCII rendering of the full region
    fn dump(&self) -> String {
        self.region().dump()
    }
}

/// Memory statistics provider
pub trait MemoryInfo {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Get memory info as (total, used, free)
    fn info(&self) -> (Size, Size, Size) {
        let stats = self.stats();
        (stats.total, stats.used, stats.free)
    }

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}

/// Garbage collection interface
pub trait GarbageCollector {
    /// Add an entry point for the mark phase
    fn register_root(&mut self, address: Address);

    /// Run a full collection now
    fn force_collect(&mut self) -> GcStats;

    /// Collections run so far, forced or allocation-triggered
    fn collections(&self) -> usize;
}

/// Any heap the workload driver can exercise
pub trait SimulatedHeap: Allocator + HeapAccess + MemoryInfo {
    /// Collector view for heaps that trace roots
    fn as_collector(&mut self) -> Option<&mut dyn GarbageCollector> {
        None
    }
}
