/*!
 * Mark-and-Sweep Collector
 *
 * Conservative tracing over untyped memory.
 *
 * ## Mark
 *
 * The work stack starts as a copy of the root set. Every popped address is
 * resolved to the allocation covering it and that allocation's head is set
 * to `Mark`. The head block and each following `Tail` block are then scanned
 * as little-endian 32-bit words at 4-byte offsets from the block start. Any
 * word in `[total_blocks, S]` is pushed as a candidate pointer, whether or
 * not it was stored as one: data that happens to look like an address keeps
 * its target alive (the known false-positive class of conservative scanning).
 *
 * Candidates that land in a free block or past the last block are dropped.
 * Candidates inside a tail block resolve to their allocation's head. Marked
 * allocations are not rescanned, so cycles terminate.
 *
 * ## Sweep
 *
 * Unmarked heads and their tails become `Free` with their bytes zeroed; every
 * `Mark` reverts to `Head`. No `Mark` survives a collection.
 */

use crate::core::limits::{BLOCK_SIZE, WORD_SIZE};
use crate::core::serialization::is_zero_usize;
use crate::core::types::{Address, Word};
use crate::memory::block_table::{block_index, BlockState, BlockTable};
use crate::memory::heap::GcHeap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Garbage collection statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GcStats {
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub roots: usize,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub marked_allocations: usize,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub scanned_words: usize,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub candidate_pointers: usize,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub freed_allocations: usize,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub freed_blocks: usize,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub freed_bytes: usize,
}

impl GcStats {
    /// Create new empty GC stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any memory was freed
    pub fn freed_any(&self) -> bool {
        self.freed_bytes > 0
    }
}

impl GcHeap {
    /// Full collection: mark from a snapshot of the roots, then sweep
    pub(crate) fn collect(&mut self) -> GcStats {
        let mut stats = GcStats::new();
        stats.roots = self.roots.len();

        let mut stack = self.roots.snapshot();
        self.mark(&mut stack, &mut stats);
        self.sweep(&mut stats);

        self.collections += 1;
        info!(
            "Garbage collection #{} complete: {} roots, {} allocations marked ({} words scanned, {} candidate pointers), freed {} allocations ({} blocks, {} bytes), {} bytes in use",
            self.collections,
            stats.roots,
            stats.marked_allocations,
            stats.scanned_words,
            stats.candidate_pointers,
            stats.freed_allocations,
            stats.freed_blocks,
            stats.freed_bytes,
            self.region.used()
        );

        self.last_collection = Some(stats.clone());
        stats
    }

    fn mark(&mut self, stack: &mut Vec<Address>, stats: &mut GcStats) {
        let total_blocks = self.total_blocks;
        let heap_end = self.region.len();
        let (metadata, data) = self.region.split_mut();
        let mut table = BlockTable::new(metadata);

        while let Some(address) = stack.pop() {
            let Some(head) = block_index(address, total_blocks, total_blocks)
                .and_then(|block| table.owning_head(block))
            else {
                continue;
            };

            table.set(head, BlockState::Mark);
            stats.marked_allocations += 1;

            let mut block = head;
            loop {
                let start = block * BLOCK_SIZE;
                for word in data[start..start + BLOCK_SIZE].chunks_exact(WORD_SIZE) {
                    let value = Word::from_le_bytes([word[0], word[1], word[2], word[3]]) as Address;
                    stats.scanned_words += 1;
                    if value >= total_blocks && value <= heap_end {
                        stack.push(value);
                        stats.candidate_pointers += 1;
                    }
                }

                block += 1;
                if block >= total_blocks || table.get(block) != BlockState::Tail {
                    break;
                }
            }
        }

        debug!(
            "Mark phase reached {} allocations",
            stats.marked_allocations
        );
    }

    fn sweep(&mut self, stats: &mut GcStats) {
        let (metadata, data) = self.region.split_mut();
        let mut table = BlockTable::new(metadata);
        let mut clear_tail = false;

        for block in 0..table.len() {
            match table.get(block) {
                BlockState::Head => {
                    release_block(&mut table, data, block);
                    stats.freed_allocations += 1;
                    stats.freed_blocks += 1;
                    clear_tail = true;
                }
                BlockState::Tail if clear_tail => {
                    release_block(&mut table, data, block);
                    stats.freed_blocks += 1;
                }
                BlockState::Mark => {
                    table.set(block, BlockState::Head);
                    clear_tail = false;
                }
                BlockState::Free | BlockState::Tail => clear_tail = false,
            }
        }

        stats.freed_bytes = stats.freed_blocks * BLOCK_SIZE;
        debug!(
            "Sweep freed {} blocks, {} blocks still occupied",
            stats.freed_blocks,
            table.occupied()
        );
        self.region.release(stats.freed_bytes);
    }
}

fn release_block(table: &mut BlockTable<&mut [u8]>, data: &mut [u8], block: usize) {
    table.set(block, BlockState::Free);
    let start = block * BLOCK_SIZE;
    data[start..start + BLOCK_SIZE].fill(0);
}
