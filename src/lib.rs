/*!
 * GC Heap Simulator Library
 * Simulated byte heaps with bump, free-list and mark-and-sweep allocators
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod workload;

// Re-exports
pub use crate::core::limits;
pub use crate::core::types::{Address, Size, Word};
pub use memory::{
    Allocator, BlockState, BumpHeap, FreeListHeap, GarbageCollector, GcHeap, GcStats, HeapAccess,
    MemoryError, MemoryInfo, MemoryPressure, MemoryResult, MemoryStats, SimulatedHeap,
};
pub use monitoring::init_tracing;
pub use workload::{run_workload, HeapVariant, WorkloadConfig, WorkloadReport};
