//! Property-based checks over sequences of `allocate`/`free` calls.
use buddy_alloc::{BuddyAllocator, FixedHeap, Header, NullSink, HEADER_SIZE};

const ORDER_MIN: u32 = 5;
const NUM_FREE_LISTS: usize = 10;
const MAX_BLOCK_SIZE: usize = 16384;

type Heap = FixedHeap<MAX_BLOCK_SIZE, MAX_BLOCK_SIZE>;
type Allocator = BuddyAllocator<Heap, NullSink, NUM_FREE_LISTS>;

fn new_allocator() -> Allocator {
    let mut a = BuddyAllocator::new(Heap::new(), NullSink, ORDER_MIN);
    a.init();
    a
}

unsafe fn header_at(p: *mut u8) -> Header {
    unsafe { Header::from_bits(((p as usize - HEADER_SIZE) as *const u64).read()) }
}

fn order_of(rsize: usize) -> u32 {
    buddy_alloc::order_of(rsize, HEADER_SIZE, 32)
}

quickcheck::quickcheck! {
    // Invariant 1: the header immediately preceding a fresh allocation
    // always records allocated=true, the size class's own order, the exact
    // caller-requested size, and a padded bit consistent with that size.
    fn header_round_trips_every_fresh_allocation(rsize: u16) -> bool {
        let rsize = (rsize as usize % (MAX_BLOCK_SIZE - HEADER_SIZE)).max(1);
        let mut a = new_allocator();
        let p = a.allocate(rsize);
        if p.is_null() {
            return true; // size alone can't fail against an empty heap
        }
        let header = unsafe { header_at(p) };
        let expected_order = order_of(rsize);
        header.allocated()
            && header.order() == expected_order as u8
            && header.rsize() == rsize as u64
            && header.padded() == ((rsize + HEADER_SIZE) as u64 != (1u64 << expected_order))
    }

    // Invariant 7: freeing an allocation and immediately re-requesting the
    // same size, with nothing intervening, hands back the same address.
    fn free_then_realloc_same_size_reuses_the_address(rsize: u16) -> bool {
        let rsize = (rsize as usize % (MAX_BLOCK_SIZE - HEADER_SIZE)).max(1);
        let mut a = new_allocator();
        let p = a.allocate(rsize);
        if p.is_null() {
            return true;
        }
        unsafe { a.free(p) };
        let q = a.allocate(rsize);
        q == p
    }

    // Invariant 6: rounding a larger request never yields a smaller order.
    fn order_of_is_monotonic_in_size(a: u16, b: u16) -> bool {
        let (small, big) = if a <= b { (a, b) } else { (b, a) };
        let small = (small as usize).max(1);
        let big = (big as usize).max(small);
        order_of(small) <= order_of(big)
    }
}
