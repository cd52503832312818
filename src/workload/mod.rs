/*!
 * Workload Driver
 *
 * Random allocation workloads against any simulated heap.
 *
 * Each iteration requests a random size, fills the requested bytes with
 * random lowercase letters, and occasionally registers the allocation as a
 * root on collected heaps. Heaps that reclaim on `free` get a batch of random
 * live allocations freed whenever too many are live. Running out of memory
 * ends the run and is reported, not returned as an error.
 */

use crate::core::limits::{
    DEFAULT_FREE_BATCH, DEFAULT_FREE_THRESHOLD, DEFAULT_HEAP_SIZE, DEFAULT_ITERATIONS,
    DEFAULT_MAX_ALLOC, DEFAULT_MIN_ALLOC, DEFAULT_ROOT_ONE_IN,
};
use crate::core::types::{Address, Size};
use crate::memory::{
    BumpHeap, FreeListHeap, GcHeap, MemoryError, MemoryResult, MemoryStats, SimulatedHeap,
};
use clap::ValueEnum;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which allocator backs a workload run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HeapVariant {
    /// Block heap reclaimed by mark-and-sweep
    #[value(name = "gc")]
    #[serde(rename = "gc")]
    Collected,
    /// Size-headed heap reclaimed by explicit free
    FreeList,
    /// Bump heap that never reclaims
    Bump,
}

impl HeapVariant {
    pub fn build(self, size: Size) -> MemoryResult<Box<dyn SimulatedHeap>> {
        Ok(match self {
            HeapVariant::Collected => Box::new(GcHeap::new(size)?),
            HeapVariant::FreeList => Box::new(FreeListHeap::new(size)?),
            HeapVariant::Bump => Box::new(BumpHeap::new(size)?),
        })
    }
}

impl fmt::Display for HeapVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HeapVariant::Collected => write!(f, "gc"),
            HeapVariant::FreeList => write!(f, "free-list"),
            HeapVariant::Bump => write!(f, "bump"),
        }
    }
}

/// Workload parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct WorkloadConfig {
    pub heap_size: Size,
    pub iterations: usize,
    /// Smallest request (inclusive)
    pub min_size: Size,
    /// Largest request (exclusive)
    pub max_size: Size,
    /// One allocation in this many becomes a root; 0 disables roots
    pub root_one_in: u32,
    pub free_threshold: usize,
    pub free_batch: usize,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            heap_size: DEFAULT_HEAP_SIZE,
            iterations: DEFAULT_ITERATIONS,
            min_size: DEFAULT_MIN_ALLOC,
            max_size: DEFAULT_MAX_ALLOC,
            root_one_in: DEFAULT_ROOT_ONE_IN,
            free_threshold: DEFAULT_FREE_THRESHOLD,
            free_batch: DEFAULT_FREE_BATCH,
            seed: 0,
        }
    }
}

impl WorkloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heap_size(mut self, heap_size: Size) -> Self {
        self.heap_size = heap_size;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_sizes(mut self, min_size: Size, max_size: Size) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_root_one_in(mut self, root_one_in: u32) -> Self {
        self.root_one_in = root_one_in;
        self
    }

    pub fn with_free_policy(mut self, threshold: usize, batch: usize) -> Self {
        self.free_threshold = threshold;
        self.free_batch = batch;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.min_size == 0 {
            return Err(MemoryError::invalid_size(
                self.min_size,
                "smallest request must be at least one byte",
            ));
        }
        if self.max_size <= self.min_size {
            return Err(MemoryError::invalid_size(
                self.max_size,
                format!("largest request must exceed the smallest ({})", self.min_size),
            ));
        }
        Ok(())
    }
}

/// Outcome of a workload run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkloadReport {
    pub allocations: usize,
    pub requested_bytes: Size,
    pub roots_registered: usize,
    pub frees: usize,
    pub out_of_memory: bool,
    pub stats: MemoryStats,
}

/// Run `config` against `heap`
pub fn run_workload(
    heap: &mut dyn SimulatedHeap,
    config: &WorkloadConfig,
) -> MemoryResult<WorkloadReport> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut live: Vec<Address> = Vec::new();
    let mut allocations = 0;
    let mut requested_bytes = 0;
    let mut roots_registered = 0;
    let mut frees = 0;
    let mut out_of_memory = false;

    for _ in 0..config.iterations {
        let size = rng.gen_range(config.min_size..config.max_size);
        let address = match heap.alloc(size) {
            Ok(address) => address,
            Err(err) if err.is_out_of_memory() => {
                warn!("Workload stopped after {} allocations: {}", allocations, err);
                out_of_memory = true;
                break;
            }
            Err(err) => return Err(err),
        };
        allocations += 1;
        requested_bytes += size;

        for offset in 0..size {
            heap.write(address + offset, b'a' + rng.gen_range(0..26u8))?;
        }

        if config.root_one_in > 0 && rng.gen_range(0..config.root_one_in) == 0 {
            if let Some(collector) = heap.as_collector() {
                collector.register_root(address);
                roots_registered += 1;
            }
        }

        if heap.reclaims_on_free() {
            live.push(address);
            if live.len() > config.free_threshold {
                for _ in 0..config.free_batch.min(live.len()) {
                    let victim = live.swap_remove(rng.gen_range(0..live.len()));
                    heap.free(victim)?;
                    frees += 1;
                }
            }
        }
    }

    let stats = heap.stats();
    info!(
        "Workload finished: {} allocations ({} bytes requested), {} roots, {} frees, {} bytes in use, {} pressure",
        allocations,
        requested_bytes,
        roots_registered,
        frees,
        stats.used,
        heap.pressure()
    );

    Ok(WorkloadReport {
        allocations,
        requested_bytes,
        roots_registered,
        frees,
        out_of_memory,
        stats,
    })
}
