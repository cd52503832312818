/*!
 * Memory Region
 * Fixed-size byte-addressable storage with a reserved metadata prefix
 */

use super::dump::HexDump;
use super::types::{MemoryError, MemoryResult, MemoryStats};
use crate::core::limits::WORD_SIZE;
use crate::core::types::{Address, Size, Word};
use std::ops::Range;

/// Simulated physical memory
///
/// One backing allocation split into two slices: the reserved prefix
/// (`[0, reserved)`) holds allocator metadata and is only reachable by the
/// owning heap through [`MemoryRegion::metadata`] and
/// [`MemoryRegion::split_mut`]; the accessible suffix (`[reserved, len)`) is
/// what `read`/`write`/`read32`/`write32` operate on.
#[derive(Debug, Clone)]
pub struct MemoryRegion {
    bytes: Box<[u8]>,
    reserved: Size,
    used: Size,
}

impl MemoryRegion {
    /// Create a region where every byte is accessible
    pub fn new(size: Size) -> MemoryResult<Self> {
        Self::with_reserved(size, 0)
    }

    /// Create a region whose first `reserved` bytes are metadata
    pub fn with_reserved(size: Size, reserved: Size) -> MemoryResult<Self> {
        if size == 0 {
            return Err(MemoryError::invalid_size(size, "region must hold at least one byte"));
        }
        if reserved >= size {
            return Err(MemoryError::invalid_size(
                size,
                format!("{} reserved bytes leave nothing allocatable", reserved),
            ));
        }

        Ok(Self {
            bytes: vec![0u8; size].into_boxed_slice(),
            reserved,
            used: 0,
        })
    }

    pub fn len(&self) -> Size {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn reserved(&self) -> Size {
        self.reserved
    }

    pub fn used(&self) -> Size {
        self.used
    }

    /// Addresses reachable through raw access
    pub fn accessible(&self) -> Range<Address> {
        self.reserved..self.bytes.len()
    }

    fn check(&self, address: Address, width: Size) -> MemoryResult<Range<usize>> {
        let accessible = self.accessible();
        match address.checked_add(width) {
            Some(end) if address >= accessible.start && end <= accessible.end => Ok(address..end),
            _ => Err(MemoryError::BoundsViolation {
                address,
                width,
                start: accessible.start,
                end: accessible.end,
            }),
        }
    }

    /// Read single byte at address
    pub fn read(&self, address: Address) -> MemoryResult<u8> {
        let range = self.check(address, 1)?;
        Ok(self.bytes[range.start])
    }

    /// Write single byte at address
    pub fn write(&mut self, address: Address, value: u8) -> MemoryResult<()> {
        let range = self.check(address, 1)?;
        self.bytes[range.start] = value;
        Ok(())
    }

    /// Read little-endian 32-bit word at address
    pub fn read32(&self, address: Address) -> MemoryResult<Word> {
        let range = self.check(address, WORD_SIZE)?;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(&self.bytes[range]);
        Ok(Word::from_le_bytes(word))
    }

    /// Write little-endian 32-bit word at address
    pub fn write32(&mut self, address: Address, value: Word) -> MemoryResult<()> {
        let range = self.check(address, WORD_SIZE)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Zero an accessible range
    pub fn zero(&mut self, range: Range<Address>) -> MemoryResult<()> {
        let width = range.end.saturating_sub(range.start);
        let range = self.check(range.start, width)?;
        self.bytes[range].fill(0);
        Ok(())
    }

    /// Whole region, metadata included, for diagnostics
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Render the whole region, 16 bytes per row
    pub fn dump(&self) -> String {
        HexDump(&self.bytes).to_string()
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::new(self.bytes.len(), self.used, self.reserved)
    }

    pub(crate) fn metadata(&self) -> &[u8] {
        &self.bytes[..self.reserved]
    }

    /// Metadata prefix and accessible suffix as disjoint slices
    pub(crate) fn split_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        self.bytes.split_at_mut(self.reserved)
    }

    pub(crate) fn charge(&mut self, bytes: Size) {
        self.used += bytes;
        debug_assert!(self.used + self.reserved <= self.bytes.len());
    }

    pub(crate) fn release(&mut self, bytes: Size) {
        debug_assert!(bytes <= self.used);
        self.used = self.used.saturating_sub(bytes);
    }
}
