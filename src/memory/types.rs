/*!
 * Memory Types
 * Errors, statistics and pressure levels shared by every heap variant
 */

use crate::core::limits::{
    PRESSURE_CRITICAL_THRESHOLD, PRESSURE_HIGH_THRESHOLD, PRESSURE_MEDIUM_THRESHOLD,
};
use crate::core::serialization::is_zero_usize;
use crate::core::types::{Address, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes, available {available} bytes ({used} used / {total} total)")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("No free run was large enough even after a collection. Register fewer roots or use a larger heap.")
    )]
    OutOfMemory {
        requested: Size,
        available: Size,
        used: Size,
        total: Size,
    },

    #[error("Bounds violation: {width}-byte access at 0x{address:x} outside accessible range [0x{start:x}, 0x{end:x})")]
    #[diagnostic(
        code(memory::bounds_violation),
        help("Raw access is limited to the allocatable part of the region; the block table is not addressable.")
    )]
    BoundsViolation {
        address: Address,
        width: Size,
        start: Address,
        end: Address,
    },

    #[error("Invalid size {size}: {reason}")]
    #[diagnostic(code(memory::invalid_size))]
    InvalidSize { size: Size, reason: String },

    #[error("Invalid memory address: 0x{0:x}")]
    #[diagnostic(
        code(memory::invalid_address),
        help("The address does not start a live allocation.")
    )]
    InvalidAddress(Address),
}

impl MemoryError {
    pub(crate) fn invalid_size(size: Size, reason: impl Into<String>) -> Self {
        MemoryError::InvalidSize {
            size,
            reason: reason.into(),
        }
    }

    /// True for the recoverable exhaustion case
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, MemoryError::OutOfMemory { .. })
    }
}

/// Memory statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MemoryStats {
    pub total: Size,
    pub used: Size,
    pub free: Size,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub reserved: Size,
    pub usage_percentage: f64,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub collections: usize,
}

impl MemoryStats {
    /// Build stats from the raw counters; `free = total - used - reserved`
    pub fn new(total: Size, used: Size, reserved: Size) -> Self {
        let allocatable = total.saturating_sub(reserved);
        let usage_percentage = if allocatable == 0 {
            0.0
        } else {
            used as f64 / allocatable as f64 * 100.0
        };

        Self {
            total,
            used,
            free: allocatable.saturating_sub(used),
            reserved,
            usage_percentage,
            collections: 0,
        }
    }

    pub fn with_collections(mut self, collections: usize) -> Self {
        self.collections = collections;
        self
    }

    pub fn memory_pressure(&self) -> MemoryPressure {
        if self.usage_percentage >= PRESSURE_CRITICAL_THRESHOLD {
            MemoryPressure::Critical
        } else if self.usage_percentage >= PRESSURE_HIGH_THRESHOLD {
            MemoryPressure::High
        } else if self.usage_percentage >= PRESSURE_MEDIUM_THRESHOLD {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Total: {}", self.total)?;
        writeln!(f, "Used:  {}", self.used)?;
        write!(f, "Free:  {}", self.free)
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
