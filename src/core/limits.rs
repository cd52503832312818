/*!
 * Heap Limits and Constants
 *
 * Centralized location for block geometry, workload defaults and thresholds.
 * Organized by domain for maintainability and discoverability.
 */

// =============================================================================
// BLOCK GEOMETRY
// =============================================================================

/// Allocation granularity of the collected heap (16 bytes)
/// Every allocation is rounded up to a whole number of blocks
pub const BLOCK_SIZE: usize = 16;

/// Metadata cost per block: one state byte in the block table
/// The table is sized as `heap_size / (BLOCK_SIZE + BLOCK_TABLE_ENTRY_SIZE)`
pub const BLOCK_TABLE_ENTRY_SIZE: usize = 1;

/// Width of a scanned word and of the free-list size header (4 bytes)
pub const WORD_SIZE: usize = 4;

/// Largest heap the simulator accepts
/// Pointers are stored in the region as 32-bit little-endian words
pub const MAX_HEAP_SIZE: usize = u32::MAX as usize;

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Bytes rendered per row of a heap dump
pub const DUMP_ROW_WIDTH: usize = 16;

/// Usage ratio at which memory pressure is reported as MEDIUM
pub const PRESSURE_MEDIUM_THRESHOLD: f64 = 60.0;

/// Usage ratio at which memory pressure is reported as HIGH
pub const PRESSURE_HIGH_THRESHOLD: f64 = 80.0;

/// Usage ratio at which memory pressure is reported as CRITICAL
pub const PRESSURE_CRITICAL_THRESHOLD: f64 = 95.0;

// =============================================================================
// WORKLOAD DEFAULTS
// =============================================================================

/// Default simulated heap size (1KB)
pub const DEFAULT_HEAP_SIZE: usize = 1024;

/// Default number of allocation attempts per workload run
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Smallest random request (inclusive)
pub const DEFAULT_MIN_ALLOC: usize = 4;

/// Largest random request (exclusive)
pub const DEFAULT_MAX_ALLOC: usize = 32;

/// One allocation in this many becomes a root
pub const DEFAULT_ROOT_ONE_IN: u32 = 40;

/// Live allocation count above which the driver starts freeing
pub const DEFAULT_FREE_THRESHOLD: usize = 30;

/// Allocations freed per batch once the threshold is crossed
pub const DEFAULT_FREE_BATCH: usize = 5;
