/*!
 * gcheap - Main Entry Point
 *
 * Runs a random allocation workload against one of the simulated heaps,
 * then prints the final heap dump and usage statistics.
 */

use clap::Parser as ClapParser;
use miette::IntoDiagnostic;
use tracing::info;

use gc_heap_sim::limits::{
    DEFAULT_FREE_BATCH, DEFAULT_FREE_THRESHOLD, DEFAULT_HEAP_SIZE, DEFAULT_ITERATIONS,
    DEFAULT_MAX_ALLOC, DEFAULT_MIN_ALLOC, DEFAULT_ROOT_ONE_IN,
};
use gc_heap_sim::monitoring::span_workload;
use gc_heap_sim::{init_tracing, run_workload, HeapAccess, HeapVariant, WorkloadConfig};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Allocator backing the heap
    #[arg(long, value_enum, default_value_t = HeapVariant::Collected)]
    variant: HeapVariant,

    /// Total heap size in bytes, metadata included
    #[arg(long, default_value_t = DEFAULT_HEAP_SIZE)]
    heap_size: usize,

    /// Allocation attempts before stopping
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Seed for the workload generator
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Smallest request size (inclusive)
    #[arg(long, default_value_t = DEFAULT_MIN_ALLOC)]
    min_size: usize,

    /// Largest request size (exclusive)
    #[arg(long, default_value_t = DEFAULT_MAX_ALLOC)]
    max_size: usize,

    /// Register one allocation in this many as a root (0 disables)
    #[arg(long, default_value_t = DEFAULT_ROOT_ONE_IN)]
    root_one_in: u32,

    /// Skip the heap dump
    #[arg(long)]
    no_dump: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = WorkloadConfig::new()
        .with_heap_size(cli.heap_size)
        .with_iterations(cli.iterations)
        .with_sizes(cli.min_size, cli.max_size)
        .with_root_one_in(cli.root_one_in)
        .with_free_policy(DEFAULT_FREE_THRESHOLD, DEFAULT_FREE_BATCH)
        .with_seed(cli.seed);

    info!(variant = %cli.variant, heap_size = config.heap_size, "Building heap");
    let mut heap = cli.variant.build(config.heap_size)?;

    let span = span_workload(&cli.variant.to_string(), config.heap_size, config.seed);
    let report = {
        let _entered = span.enter();
        run_workload(heap.as_mut(), &config)?
    };
    span.record_allocations(report.allocations);
    span.record_out_of_memory(report.out_of_memory);
    drop(span);

    if cli.json {
        let output = serde_json::to_string_pretty(&report).into_diagnostic()?;
        println!("{}", output);
        return Ok(());
    }

    if report.out_of_memory {
        println!("Out of memory.");
    }
    if !cli.no_dump {
        print!("{}", heap.dump());
    }
    println!("{}", report.stats);

    Ok(())
}
