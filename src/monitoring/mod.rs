/*!
 * Monitoring
 * Tracing setup and workload spans for the binary
 */

mod tracer;

pub use tracer::{init_tracing, span_workload, WorkloadSpan};
