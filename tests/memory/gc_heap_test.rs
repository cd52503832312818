/*!
 * Collected Heap Tests
 * Allocation, wraparound collection, reachability and bounds behaviour
 */

use gc_heap_sim::memory::{BlockState, GcHeap, HeapAccess, MemoryError};
use pretty_assertions::assert_eq;

fn states(heap: &GcHeap, blocks: std::ops::Range<usize>) -> Vec<BlockState> {
    blocks.map(|b| heap.block_state(b).unwrap()).collect()
}

#[test]
fn test_wraparound_collection_reuses_reclaimed_space() {
    let mut heap = GcHeap::new(1024).unwrap();
    assert_eq!(heap.total_blocks(), 60);

    let a = heap.alloc(16).unwrap();
    let b = heap.alloc(16).unwrap();
    assert_eq!((a, b), (60, 76));
    heap.write(a, b'p').unwrap();
    heap.write(b + 15, b'q').unwrap();
    assert_eq!(heap.stats().used, 32);

    // 59 blocks only fit once both unrooted allocations are reclaimed
    let c = heap.alloc(59 * 16).unwrap();
    assert_eq!(c, 60);
    assert_eq!(heap.collections(), 1);

    let collection = heap.last_collection().unwrap();
    assert_eq!(collection.freed_allocations, 2);
    assert_eq!(collection.freed_bytes, 32);

    assert_eq!(heap.read(a).unwrap(), 0);
    assert_eq!(heap.read(b + 15).unwrap(), 0);
    assert_eq!(heap.block_state(0), Some(BlockState::Head));
    assert_eq!(heap.block_state(58), Some(BlockState::Tail));
    assert_eq!(heap.block_state(59), Some(BlockState::Free));
    assert_eq!(heap.stats().used, 59 * 16);
}

#[test]
fn test_rooted_allocation_survives_collection() {
    let mut heap = GcHeap::new(1024).unwrap();
    let a = heap.alloc(40).unwrap();
    heap.register_root(a);
    heap.write(a + 47, b'z').unwrap();

    let stats = heap.force_collect();
    assert_eq!(stats.marked_allocations, 1);
    assert!(!stats.freed_any());

    assert_eq!(
        states(&heap, 0..4),
        vec![BlockState::Head, BlockState::Tail, BlockState::Tail, BlockState::Free]
    );
    assert_eq!(heap.read(a + 47).unwrap(), b'z');
    assert_eq!(heap.stats().used, 48);
    assert_eq!(heap.allocation_len(a), Some(48));
}

#[test]
fn test_oversized_request_is_out_of_memory_after_one_collection() {
    let mut heap = GcHeap::new(1024).unwrap();
    let kept = heap.alloc(16).unwrap();
    heap.register_root(kept);
    let dropped = heap.alloc(32).unwrap();

    let err = heap.alloc(61 * 16).unwrap_err();
    assert!(err.is_out_of_memory());
    match err {
        MemoryError::OutOfMemory {
            requested,
            used,
            total,
            ..
        } => {
            assert_eq!(requested, 61 * 16);
            assert_eq!(used, 16);
            assert_eq!(total, 1024);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(heap.collections(), 1);
    assert_eq!(heap.stats().used, 16);
    assert_eq!(heap.block_state(0), Some(BlockState::Head));
    assert_eq!(states(&heap, 1..3), vec![BlockState::Free; 2]);
    assert_eq!(heap.allocation_len(dropped), None);
}

#[test]
fn test_pointer_chain_is_traced() {
    let mut heap = GcHeap::new(1024).unwrap();
    let a = heap.alloc(16).unwrap();
    let b = heap.alloc(16).unwrap();
    let c = heap.alloc(16).unwrap();
    let d = heap.alloc(16).unwrap();

    heap.register_root(a);
    heap.write32(a, b as u32).unwrap();
    heap.write32(b + 4, c as u32).unwrap();

    let stats = heap.force_collect();
    assert_eq!(stats.marked_allocations, 3);
    assert_eq!(stats.freed_allocations, 1);

    assert_eq!(
        states(&heap, 0..4),
        vec![BlockState::Head, BlockState::Head, BlockState::Head, BlockState::Free]
    );
    assert_eq!(heap.read32(a).unwrap(), b as u32);
    assert_eq!(heap.read32(b + 4).unwrap(), c as u32);
    assert_eq!(heap.allocation_len(d), None);
}

#[test]
fn test_cycles_terminate() {
    let mut heap = GcHeap::new(1024).unwrap();
    let a = heap.alloc(16).unwrap();
    let b = heap.alloc(16).unwrap();
    heap.write32(a, b as u32).unwrap();
    heap.write32(b, a as u32).unwrap();

    heap.register_root(a);
    let stats = heap.force_collect();
    assert_eq!(stats.marked_allocations, 2);
    assert_eq!(heap.live_allocations(), 2);

    // Unrooted, the cycle is garbage
    assert!(heap.unregister_root(a));
    let stats = heap.force_collect();
    assert_eq!(stats.freed_allocations, 2);
    assert_eq!(heap.live_allocations(), 0);
    assert_eq!(heap.stats().used, 0);
}

#[test]
fn test_interior_pointer_keeps_whole_allocation() {
    let mut heap = GcHeap::new(1024).unwrap();
    let a = heap.alloc(48).unwrap();
    let b = heap.alloc(40).unwrap();
    assert_eq!((a, b), (60, 108));
    heap.register_root(a);

    // Stored in a's last block, pointing into b's last block
    heap.write32(a + 36, (b + 33) as u32).unwrap();

    heap.force_collect();
    assert_eq!(heap.allocation_len(b), Some(48));
    assert_eq!(
        states(&heap, 3..6),
        vec![BlockState::Head, BlockState::Tail, BlockState::Tail]
    );
}

#[test]
fn test_misaligned_pointer_is_not_seen() {
    let mut heap = GcHeap::new(1024).unwrap();
    let a = heap.alloc(16).unwrap();
    let b = heap.alloc(16).unwrap();
    heap.register_root(a);
    heap.write32(a + 1, b as u32).unwrap();

    heap.force_collect();
    assert_eq!(heap.allocation_len(a), Some(16));
    assert_eq!(heap.allocation_len(b), None);
}

#[test]
fn test_in_range_data_is_retained_conservatively() {
    let mut heap = GcHeap::new(1024).unwrap();
    let a = heap.alloc(16).unwrap();
    let b = heap.alloc(64).unwrap();
    heap.register_root(a);

    // 128 is plain data that happens to land in b's last block
    heap.write32(a + 8, 128).unwrap();
    // Free block, heap end and trailing slack are ignored
    heap.write32(a + 12, (60 + 40 * 16) as u32).unwrap();
    heap.write32(a + 4, 1024).unwrap();
    heap.write32(a, 1021).unwrap();

    let stats = heap.force_collect();
    assert_eq!(stats.candidate_pointers, 4);
    assert_eq!(stats.marked_allocations, 2);
    assert_eq!(heap.allocation_len(b), Some(64));
    assert_eq!(heap.block_state(40), Some(BlockState::Free));
}

#[test]
fn test_stale_roots_are_harmless() {
    let mut heap = GcHeap::new(1024).unwrap();
    let a = heap.alloc(32).unwrap();

    heap.register_root(10);
    heap.register_root(5000);
    heap.register_root(1022);
    heap.register_root(a + 700);

    let stats = heap.force_collect();
    assert_eq!(stats.roots, 4);
    assert_eq!(stats.marked_allocations, 0);
    assert_eq!(stats.freed_allocations, 1);

    // A root left pointing at freed space holds nothing
    heap.register_root(a);
    let b = heap.alloc(16).unwrap();
    assert_eq!(heap.block_of(b), Some(2));
    heap.force_collect();
    assert_eq!(heap.live_allocations(), 0);
}

#[test]
fn test_no_mark_survives_collection() {
    let mut heap = GcHeap::new(1024).unwrap();
    for size in [16, 40, 8, 100] {
        let addr = heap.alloc(size).unwrap();
        heap.register_root(addr);
    }
    heap.force_collect();

    let marks = (0..heap.total_blocks())
        .filter(|&b| heap.block_state(b) == Some(BlockState::Mark))
        .count();
    assert_eq!(marks, 0);
    assert_eq!(heap.live_allocations(), 4);
}

#[test]
fn test_metadata_and_end_are_out_of_bounds() {
    let mut heap = GcHeap::new(1024).unwrap();

    assert_eq!(
        heap.read(0),
        Err(MemoryError::BoundsViolation {
            address: 0,
            width: 1,
            start: 60,
            end: 1024,
        })
    );
    assert!(heap.read(59).is_err());
    assert!(heap.read(1024).is_err());
    assert!(heap.write(1024, 1).is_err());
    assert!(heap.read32(1021).is_err());
    assert!(heap.write32(58, 7).is_err());

    assert!(heap.read(60).is_ok());
    assert!(heap.read(1023).is_ok());
    heap.write32(1020, 0xdead_beef).unwrap();
    assert_eq!(heap.read32(1020).unwrap(), 0xdead_beef);
    assert_eq!(heap.read(1020).unwrap(), 0xef);
}

#[test]
fn test_dump_includes_block_table() {
    let mut heap = GcHeap::new(34).unwrap();
    assert_eq!(heap.total_blocks(), 2);

    let a = heap.alloc(1).unwrap();
    assert_eq!(a, 2);
    heap.write(a, b'h').unwrap();

    let expected = concat!(
        "0x0000: 01 00 h  00 00 00 00 00 00 00 00 00 00 00 00 00 \n",
        "0x0010: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 \n",
        "0x0020: 00 00 \n",
    );
    assert_eq!(heap.dump(), expected);
}
