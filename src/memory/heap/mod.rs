/*!
 * Collected Heap
 *
 * Block-based heap reclaimed only by a conservative mark-and-sweep collector.
 *
 * ## Layout
 *
 * A region of `S` bytes is split into:
 * - **Block table** (`[0, total_blocks)`): one state byte per block,
 *   `total_blocks = S / (BLOCK_SIZE + 1)`
 * - **Allocation area** (`[total_blocks, S)`): block `i` starts at
 *   `total_blocks + i * BLOCK_SIZE`; trailing slack past the last block is
 *   never handed out
 *
 * ## Features
 *
 * - **Next-fit search**: a persistent cursor starts each search where the last
 *   allocation ended, wrapping to the start of the table
 * - **Deferred collection**: the second wrap of one `alloc` call runs a single
 *   collection; a wrap after that is out of memory
 * - **No explicit free**: `free` is accepted and ignored
 */

mod allocator;

use super::block_table::{block_index, BlockState, BlockTable};
use super::gc::GcStats;
use super::region::MemoryRegion;
use super::roots::RootSet;
use super::traits::{Allocator, GarbageCollector, HeapAccess, MemoryInfo, SimulatedHeap};
use super::types::{MemoryError, MemoryResult, MemoryStats};
use crate::core::limits::{BLOCK_SIZE, BLOCK_TABLE_ENTRY_SIZE, MAX_HEAP_SIZE};
use crate::core::types::{Address, Size};
use log::{debug, info};

/// Heap with a co-resident block table and a tracing collector
#[derive(Debug, Clone)]
pub struct GcHeap {
    pub(crate) region: MemoryRegion,
    pub(crate) total_blocks: usize,
    // Search cursor, always in [0, total_blocks]
    pub(crate) next: usize,
    pub(crate) roots: RootSet,
    pub(crate) collections: usize,
    pub(crate) last_collection: Option<GcStats>,
}

impl GcHeap {
    pub fn new(size: Size) -> MemoryResult<Self> {
        if size > MAX_HEAP_SIZE {
            return Err(MemoryError::invalid_size(
                size,
                "heap must fit in the 32-bit address space scanned by the collector",
            ));
        }

        let total_blocks = size / (BLOCK_SIZE + BLOCK_TABLE_ENTRY_SIZE);
        if total_blocks == 0 {
            return Err(MemoryError::invalid_size(
                size,
                format!(
                    "heap needs at least {} bytes for one block and its table entry",
                    BLOCK_SIZE + BLOCK_TABLE_ENTRY_SIZE
                ),
            ));
        }

        let region = MemoryRegion::with_reserved(size, total_blocks)?;
        info!(
            "Collected heap initialized with {} bytes: {} blocks of {} bytes, {} bytes reserved for the block table",
            size, total_blocks, BLOCK_SIZE, total_blocks
        );

        Ok(Self {
            region,
            total_blocks,
            next: 0,
            roots: RootSet::new(),
            collections: 0,
            last_collection: None,
        })
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    /// Data address of `block`
    pub fn data_address(&self, block: usize) -> Address {
        self.total_blocks + block * BLOCK_SIZE
    }

    /// Block containing `address`, if it lies in the allocation area
    pub fn block_of(&self, address: Address) -> Option<usize> {
        block_index(address, self.total_blocks, self.total_blocks)
    }

    pub fn block_state(&self, block: usize) -> Option<BlockState> {
        self.table().state(block)
    }

    /// Byte length of the live allocation starting exactly at `address`
    pub fn allocation_len(&self, address: Address) -> Option<Size> {
        let block = self.block_of(address)?;
        if self.data_address(block) != address {
            return None;
        }
        let table = self.table();
        match table.get(block) {
            BlockState::Head | BlockState::Mark => Some(table.run_length(block) * BLOCK_SIZE),
            BlockState::Free | BlockState::Tail => None,
        }
    }

    /// Number of live allocations
    pub fn live_allocations(&self) -> usize {
        self.table().heads()
    }

    /// Ignored: memory is reclaimed only by collection
    pub fn free(&mut self, address: Address) -> MemoryResult<()> {
        debug!(
            "Ignoring free of 0x{:x}: collected heap reclaims only unreachable blocks",
            address
        );
        Ok(())
    }

    pub fn register_root(&mut self, address: Address) {
        debug!("Registered root 0x{:x}", address);
        self.roots.register(address);
    }

    /// Remove the first registration of `address`
    pub fn unregister_root(&mut self, address: Address) -> bool {
        self.roots.unregister(address)
    }

    pub fn roots(&self) -> &RootSet {
        &self.roots
    }

    /// Run a collection outside of allocation (for harnesses and testing)
    pub fn force_collect(&mut self) -> GcStats {
        info!("Forcing garbage collection...");
        self.collect()
    }

    pub fn collections(&self) -> usize {
        self.collections
    }

    pub fn last_collection(&self) -> Option<&GcStats> {
        self.last_collection.as_ref()
    }

    pub fn stats(&self) -> MemoryStats {
        self.region.stats().with_collections(self.collections)
    }

    pub(crate) fn table(&self) -> BlockTable<&[u8]> {
        BlockTable::new(self.region.metadata())
    }
}

// Implement trait interfaces
impl Allocator for GcHeap {
    fn alloc(&mut self, size: Size) -> MemoryResult<Address> {
        GcHeap::alloc(self, size)
    }

    fn free(&mut self, address: Address) -> MemoryResult<()> {
        GcHeap::free(self, address)
    }
}

impl HeapAccess for GcHeap {
    fn region(&self) -> &MemoryRegion {
        &self.region
    }

    fn region_mut(&mut self) -> &mut MemoryRegion {
        &mut self.region
    }
}

impl MemoryInfo for GcHeap {
    fn stats(&self) -> MemoryStats {
        GcHeap::stats(self)
    }
}

impl GarbageCollector for GcHeap {
    fn register_root(&mut self, address: Address) {
        GcHeap::register_root(self, address)
    }

    fn force_collect(&mut self) -> GcStats {
        GcHeap::force_collect(self)
    }

    fn collections(&self) -> usize {
        GcHeap::collections(self)
    }
}

impl SimulatedHeap for GcHeap {
    fn as_collector(&mut self) -> Option<&mut dyn GarbageCollector> {
        Some(self)
    }
}
