/*!
 * Heap Variant Tests
 * Bump and free-list heaps through the shared traits
 */

use gc_heap_sim::memory::{
    Allocator, BumpHeap, FreeListHeap, HeapAccess, MemoryError, MemoryInfo, SimulatedHeap,
};
use pretty_assertions::assert_eq;

fn fill(heap: &mut dyn SimulatedHeap, address: usize, len: usize, byte: u8) {
    for offset in 0..len {
        heap.write(address + offset, byte).unwrap();
    }
}

#[test]
fn test_bump_heap_hands_out_consecutive_ranges() {
    let mut heap = BumpHeap::new(64).unwrap();
    assert_eq!(heap.alloc(10).unwrap(), 0);
    assert_eq!(heap.alloc(6).unwrap(), 10);
    assert!(heap.alloc(48).unwrap_err().is_out_of_memory());
    assert_eq!(heap.alloc(47).unwrap(), 16);
    assert_eq!(heap.info(), (64, 63, 1));

    assert!(heap.alloc(1).unwrap_err().is_out_of_memory());
    assert_eq!(heap.stats().used, 63);
}

#[test]
fn test_bump_heap_ignores_free() {
    let mut heap = BumpHeap::new(32).unwrap();
    let a = heap.alloc(16).unwrap();
    heap.free(a).unwrap();
    assert!(!heap.reclaims_on_free());
    assert!(heap.alloc(16).is_err());
    assert_eq!(heap.alloc(15).unwrap(), 16);
    assert!(heap.alloc(1).is_err());
}

#[test]
fn test_bump_heap_has_no_collector() {
    let mut heap = BumpHeap::new(32).unwrap();
    assert!(heap.as_collector().is_none());
    assert!(heap.read(0).is_ok());
    assert!(heap.read(32).is_err());
}

#[test]
fn test_free_list_reuses_freed_runs_after_wrap() {
    let mut heap = FreeListHeap::new(64).unwrap();
    let a = heap.alloc(20).unwrap();
    let b = heap.alloc(20).unwrap();
    assert_eq!((a, b), (4, 28));
    assert_eq!(heap.stats().used, 48);
    fill(&mut heap, a, 20, b'x');

    heap.free(a).unwrap();
    assert_eq!(heap.stats().used, 24);
    assert_eq!(heap.read32(0).unwrap(), 0);
    assert_eq!(heap.read(a + 19).unwrap(), 0);

    // 16 bytes left at the end; the request wraps into a's old run
    let c = heap.alloc(20).unwrap();
    assert_eq!(c, a);
    assert_eq!(heap.read32(0).unwrap(), 24);
}

#[test]
fn test_free_list_skips_live_headers() {
    let mut heap = FreeListHeap::new(52).unwrap();
    let a = heap.alloc(8).unwrap();
    let b = heap.alloc(8).unwrap();
    let c = heap.alloc(8).unwrap();
    assert_eq!((a, b, c), (4, 16, 28));
    heap.free(a).unwrap();
    heap.free(c).unwrap();

    // Wraps to 0, meets b's header at 12 and skips to 24
    let d = heap.alloc(20).unwrap();
    assert_eq!(d, 28);
    assert_eq!(heap.read32(24).unwrap(), 24);
    assert_eq!(heap.read32(12).unwrap(), 12);
}

#[test]
fn test_free_list_rejects_bad_frees() {
    let mut heap = FreeListHeap::new(64).unwrap();
    let a = heap.alloc(4).unwrap();
    heap.free(a).unwrap();

    assert_eq!(heap.free(a), Err(MemoryError::InvalidAddress(a)));
    assert_eq!(heap.free(0), Err(MemoryError::InvalidAddress(0)));
    assert_eq!(heap.free(500), Err(MemoryError::InvalidAddress(500)));
    assert!(heap.reclaims_on_free());
}

#[test]
fn test_free_list_out_of_memory_leaves_heap_intact() {
    let mut heap = FreeListHeap::new(32).unwrap();
    let a = heap.alloc(12).unwrap();
    heap.write(a, b'm').unwrap();

    assert!(heap.alloc(28).unwrap_err().is_out_of_memory());
    // The free tail is exactly 16 bytes, which never fits a 16-byte run
    assert!(heap.alloc(12).unwrap_err().is_out_of_memory());
    assert!(heap.alloc(100).unwrap_err().is_out_of_memory());
    assert_eq!(heap.stats().used, 16);
    assert_eq!(heap.read(a).unwrap(), b'm');
}
