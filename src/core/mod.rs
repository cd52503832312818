/*!
 * Core Module
 * Fundamental simulator types, limits and serialization helpers
 */

pub mod limits;
pub mod serialization;
pub mod types;

// Re-export for convenience
pub use types::*;
