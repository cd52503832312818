/*!
 * Garbage Collection
 * Conservative mark-and-sweep over the collected heap's block table
 */

pub mod collector;

pub use collector::GcStats;
