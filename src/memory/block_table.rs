/*!
 * Block Table
 * Per-block allocation state stored in the region's metadata prefix
 */

use crate::core::limits::BLOCK_SIZE;
use crate::core::types::Address;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Allocation state of one block
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockState {
    /// Not part of any allocation
    Free = 0,
    /// First block of a live allocation
    Head = 1,
    /// Continuation block of the allocation started by the nearest preceding head
    Tail = 2,
    /// Head reached by the current mark phase; reverted to `Head` by sweep
    Mark = 3,
}

impl BlockState {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(BlockState::Free),
            1 => Some(BlockState::Head),
            2 => Some(BlockState::Tail),
            3 => Some(BlockState::Mark),
            _ => None,
        }
    }
}

/// Block index owning `address`, if it lies inside one of `blocks` blocks
/// whose data starts at `data_start`
pub fn block_index(address: Address, data_start: Address, blocks: usize) -> Option<usize> {
    let block = address.checked_sub(data_start)? / BLOCK_SIZE;
    (block < blocks).then_some(block)
}

/// View over the state bytes, read-only or mutable depending on `T`
#[derive(Debug)]
pub struct BlockTable<T> {
    entries: T,
}

impl<T: AsRef<[u8]>> BlockTable<T> {
    pub fn new(entries: T) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.as_ref().is_empty()
    }

    /// State of an in-range block
    ///
    /// Entries are only ever written through [`BlockTable::set`].
    pub fn get(&self, block: usize) -> BlockState {
        BlockState::from_byte(self.entries.as_ref()[block]).unwrap_or(BlockState::Free)
    }

    pub fn state(&self, block: usize) -> Option<BlockState> {
        (block < self.len()).then(|| self.get(block))
    }

    /// First block in `run` that is not free
    pub fn first_occupied(&self, mut run: Range<usize>) -> Option<usize> {
        run.find(|&block| self.get(block) != BlockState::Free)
    }

    /// Head of the unmarked allocation covering `block`
    ///
    /// Interior blocks resolve backwards through their tails. Free blocks and
    /// allocations already marked yield `None`.
    pub fn owning_head(&self, block: usize) -> Option<usize> {
        let mut current = block;
        loop {
            match self.state(current)? {
                BlockState::Head => return Some(current),
                BlockState::Tail => current = current.checked_sub(1)?,
                BlockState::Free | BlockState::Mark => return None,
            }
        }
    }

    /// Blocks in the allocation starting at `head`, tail walk bounded by the table
    pub fn run_length(&self, head: usize) -> usize {
        1 + (head + 1..self.len())
            .take_while(|&block| self.get(block) == BlockState::Tail)
            .count()
    }

    /// Blocks that belong to some allocation
    pub fn occupied(&self) -> usize {
        (0..self.len())
            .filter(|&block| self.get(block) != BlockState::Free)
            .count()
    }

    /// Number of allocation heads, marked or not
    pub fn heads(&self) -> usize {
        (0..self.len())
            .filter(|&block| matches!(self.get(block), BlockState::Head | BlockState::Mark))
            .count()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> BlockTable<T> {
    pub fn set(&mut self, block: usize, state: BlockState) {
        self.entries.as_mut()[block] = state.as_byte();
    }

    /// Mark `count` blocks from `start` as one allocation
    pub fn claim(&mut self, start: usize, count: usize) {
        self.set(start, BlockState::Head);
        for block in start + 1..start + count {
            self.set(block, BlockState::Tail);
        }
    }
}
