/*!
 * Memory Module
 * Simulated memory regions and the allocators that manage them
 */

pub mod block_table;
pub mod bump;
pub mod dump;
pub mod free_list;
pub mod gc;
pub mod heap;
pub mod region;
pub mod roots;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use block_table::{BlockState, BlockTable};
pub use bump::BumpHeap;
pub use dump::HexDump;
pub use free_list::FreeListHeap;
pub use gc::GcStats;
pub use heap::GcHeap;
pub use region::MemoryRegion;
pub use roots::RootSet;
pub use traits::*;
pub use types::*;
