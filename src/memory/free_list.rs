/*!
 * Free-List Heap
 * Size-headed allocations reclaimed by explicit `free`
 */

use super::region::MemoryRegion;
use super::traits::{Allocator, HeapAccess, MemoryInfo, SimulatedHeap};
use super::types::{MemoryError, MemoryResult, MemoryStats};
use crate::core::limits::{MAX_HEAP_SIZE, WORD_SIZE};
use crate::core::types::{Address, Size, Word};
use log::{debug, warn};

/// Heap where each allocation carries its total size in a 4-byte header
///
/// Free memory is all zero, so a non-zero word met while looking for a run
/// is the header of a live allocation and the search skips over it by the
/// recorded size. `free` zeroes the whole run, header included.
#[derive(Debug, Clone)]
pub struct FreeListHeap {
    region: MemoryRegion,
    next: Address,
}

impl FreeListHeap {
    pub fn new(size: Size) -> MemoryResult<Self> {
        if size > MAX_HEAP_SIZE {
            return Err(MemoryError::invalid_size(
                size,
                "size headers are 32-bit words",
            ));
        }

        Ok(Self {
            region: MemoryRegion::new(size)?,
            next: 0,
        })
    }

    /// Allocate `size` bytes behind a size header, rounded up to whole words
    pub fn alloc(&mut self, size: Size) -> MemoryResult<Address> {
        if size == 0 {
            return Err(MemoryError::invalid_size(
                size,
                "allocation requests must be at least one byte",
            ));
        }

        let len = self.region.len();
        let total = size
            .checked_add(2 * WORD_SIZE - 1)
            .map(|padded| padded / WORD_SIZE * WORD_SIZE)
            .filter(|&total| total < len)
            .ok_or_else(|| self.out_of_memory(size))?;

        // Set after the first wrap; a second wrap fails
        let mut wrapped = false;

        loop {
            if self.next > len || total >= len - self.next {
                if wrapped {
                    return Err(self.out_of_memory(size));
                }
                wrapped = true;
                self.next = 0;
                continue;
            }

            match self.first_header(self.next, total)? {
                Some((position, header)) => self.next = position.saturating_add(header),
                None => {
                    let start = self.next;
                    self.region.write32(start, total as Word)?;
                    self.region.charge(total);
                    self.next = start + total;
                    debug!("Allocated {} bytes (header included) at 0x{:x}", total, start);
                    return Ok(start + WORD_SIZE);
                }
            }
        }
    }

    /// Zero the allocation whose payload starts at `address`
    pub fn free(&mut self, address: Address) -> MemoryResult<()> {
        let header = address
            .checked_sub(WORD_SIZE)
            .ok_or(MemoryError::InvalidAddress(address))?;
        let size = self
            .region
            .read32(header)
            .map_err(|_| MemoryError::InvalidAddress(address))? as Size;

        if size == 0 || size > self.region.len() - header {
            warn!("Rejected free of 0x{:x}: no live allocation header", address);
            return Err(MemoryError::InvalidAddress(address));
        }

        self.region.zero(header..header + size)?;
        self.region.release(size);
        debug!("Freed {} bytes at 0x{:x}", size, header);
        Ok(())
    }

    /// First non-zero word in `[start, start + total)` with its value
    fn first_header(&self, start: Address, total: Size) -> MemoryResult<Option<(Address, Size)>> {
        for position in (start..start + total).step_by(WORD_SIZE) {
            let word = self.region.read32(position)?;
            if word > 0 {
                return Ok(Some((position, word as Size)));
            }
        }
        Ok(None)
    }

    fn out_of_memory(&self, requested: Size) -> MemoryError {
        let stats = self.region.stats();
        warn!(
            "OOM: requested {} bytes, no free run found ({} used / {} total)",
            requested, stats.used, stats.total
        );
        MemoryError::OutOfMemory {
            requested,
            available: stats.free,
            used: stats.used,
            total: stats.total,
        }
    }
}

impl Allocator for FreeListHeap {
    fn alloc(&mut self, size: Size) -> MemoryResult<Address> {
        FreeListHeap::alloc(self, size)
    }

    fn free(&mut self, address: Address) -> MemoryResult<()> {
        FreeListHeap::free(self, address)
    }

    fn reclaims_on_free(&self) -> bool {
        true
    }
}

impl HeapAccess for FreeListHeap {
    fn region(&self) -> &MemoryRegion {
        &self.region
    }

    fn region_mut(&mut self) -> &mut MemoryRegion {
        &mut self.region
    }
}

impl MemoryInfo for FreeListHeap {
    fn stats(&self) -> MemoryStats {
        self.region.stats()
    }
}

impl SimulatedHeap for FreeListHeap {}
