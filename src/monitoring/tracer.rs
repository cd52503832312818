/*!
 * Structured Tracing
 * Subscriber setup and workload spans using the tracing crate
 *
 * Library code logs through the `log` facade; the subscriber installed here
 * bridges those records so they share filtering and formatting with spans.
 */

use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Runs slower than this are reported at warn level
const SLOW_RUN_MS: u128 = 1000;

/// Initialize structured tracing on stderr
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - GCHEAP_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("GCHEAP_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one workload run
pub struct WorkloadSpan {
    span: tracing::Span,
    start: Instant,
}

impl WorkloadSpan {
    pub fn new(variant: &str, heap_size: usize, seed: u64) -> Self {
        let span = span!(
            Level::INFO,
            "workload",
            variant = variant,
            heap_size = heap_size as u64,
            seed = seed,
            allocations = tracing::field::Empty,
            out_of_memory = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        let _entered = span.enter();
        debug!(variant = variant, heap_size = heap_size as u64, "workload started");
        drop(_entered);

        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn record_allocations(&self, count: usize) {
        self.span.record("allocations", count as u64);
    }

    pub fn record_out_of_memory(&self, out_of_memory: bool) {
        self.span.record("out_of_memory", out_of_memory);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for WorkloadSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration.as_millis() > SLOW_RUN_MS {
            warn!(
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow workload run"
            );
        } else {
            debug!(duration_us = duration.as_micros() as u64, "workload completed");
        }
    }
}

/// Helper to create a workload span
#[inline]
pub fn span_workload(variant: &str, heap_size: usize, seed: u64) -> WorkloadSpan {
    WorkloadSpan::new(variant, heap_size, seed)
}
