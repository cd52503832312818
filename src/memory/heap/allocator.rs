/*!
 * Collected Heap Allocation
 * Next-fit run search with wraparound and a single collection on exhaustion
 */

use super::GcHeap;
use crate::core::limits::BLOCK_SIZE;
use crate::core::types::{Address, Size};
use crate::memory::block_table::BlockTable;
use crate::memory::types::{MemoryError, MemoryResult};
use log::{debug, warn};

impl GcHeap {
    /// Allocate `size` bytes rounded up to whole blocks
    ///
    /// The search starts at the cursor. A non-free block aborts the current
    /// candidate run and the search resumes right after that block. A run
    /// that would reach the last block wraps the cursor to block 0, so the
    /// final block of the table is never handed out. The first wrap only
    /// restarts the search, the second runs one collection, and a wrap after
    /// that collection fails with `OutOfMemory`.
    pub fn alloc(&mut self, size: Size) -> MemoryResult<Address> {
        if size == 0 {
            return Err(MemoryError::invalid_size(
                size,
                "allocation requests must be at least one byte",
            ));
        }

        let n_blocks = size.div_ceil(BLOCK_SIZE);
        let mut wrapped = false;
        let mut collected = false;

        loop {
            if n_blocks >= self.total_blocks - self.next {
                if wrapped {
                    if collected {
                        let stats = self.stats();
                        warn!(
                            "OOM: requested {} bytes ({} blocks), only {} bytes free after collection ({} used / {} total)",
                            size, n_blocks, stats.free, stats.used, stats.total
                        );
                        return Err(MemoryError::OutOfMemory {
                            requested: size,
                            available: stats.free,
                            used: stats.used,
                            total: stats.total,
                        });
                    }

                    debug!(
                        "No run of {} free blocks after a full pass, collecting",
                        n_blocks
                    );
                    self.collect();
                    collected = true;
                    wrapped = false;
                } else {
                    wrapped = true;
                }
                self.next = 0;
                continue;
            }

            let run = self.next..self.next + n_blocks;
            match self.table().first_occupied(run) {
                Some(occupied) => self.next = occupied + 1,
                None => return Ok(self.claim(self.next, n_blocks)),
            }
        }
    }

    fn claim(&mut self, start: usize, n_blocks: usize) -> Address {
        let (metadata, _) = self.region.split_mut();
        BlockTable::new(metadata).claim(start, n_blocks);

        let bytes = n_blocks * BLOCK_SIZE;
        self.region.charge(bytes);
        self.next = start + n_blocks;

        let address = self.data_address(start);
        debug!(
            "Allocated {} bytes ({} blocks) at 0x{:x}",
            bytes, n_blocks, address
        );
        address
    }
}
