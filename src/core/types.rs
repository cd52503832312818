/*!
 * Core Types
 * Common types used across the heap simulator
 */

/// Address type for simulated memory operations
pub type Address = usize;

/// Size type for simulated memory operations
pub type Size = usize;

/// Machine word as stored inside the simulated region (little-endian)
pub type Word = u32;
