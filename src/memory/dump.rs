/*!
 * Heap Dump
 * Fixed-width hex/ASCII rendering of a region
 */

use crate::core::limits::DUMP_ROW_WIDTH;
use std::fmt;

/// Renders 16 bytes per row as `0xOOOO: ` followed by one cell per byte
///
/// Lowercase ASCII letters print as the character, everything else as two
/// hex digits. Every cell is two columns wide plus a separating space.
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (row, chunk) in self.0.chunks(DUMP_ROW_WIDTH).enumerate() {
            write!(f, "0x{:04x}: ", row * DUMP_ROW_WIDTH)?;
            for &byte in chunk {
                if byte.is_ascii_lowercase() {
                    write!(f, "{:2} ", byte as char)?;
                } else {
                    write!(f, "{:02x} ", byte)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
