//! The policy layer: `allocate`, `reallocate`, `free`, and heap growth.
use buddy_base::{trace, AllocError, DiagnosticsSink, HeapProvider, LastError};
use buddy_list::{FreeListRegistry, Node};

use crate::coalescer::coalesce;
use crate::header::{is_padded, Header, HEADER_SIZE};
use crate::size_class::order_of;
use crate::splitter::split;

/// A binary buddy-block allocator over a heap supplied by `P`, narrating
/// decisions through `D`.
///
/// `N` is the number of free lists, i.e. `ORDER_MAX - ORDER_MIN`; `ORDER_MIN`
/// itself is a runtime field (mirroring DCNick3-horizon-rs's cached
/// `min_block_size_log2`) so the same binary can host heaps with different
/// minimum block sizes without a new monomorphization per `ORDER_MIN`.
///
/// Free-list heads, the heap extent (via `provider`), and the last-error
/// slot are process-wide state in spirit — but all of them live inside this
/// struct rather than behind statics, so a test can construct a fresh
/// allocator per case instead of fighting shared global state between them.
pub struct BuddyAllocator<P, D, const N: usize> {
    provider: P,
    diag: D,
    free_lists: FreeListRegistry<N>,
    order_min: u32,
    last_error: LastError,
}

impl<P, D, const N: usize> BuddyAllocator<P, D, N>
where
    P: HeapProvider,
    D: DiagnosticsSink,
{
    /// Construct an allocator for blocks of order `order_min ..=
    /// order_min + N - 1`.
    ///
    /// The returned value is *not* ready to use: its free-list sentinels are
    /// not yet self-referential, because they must point at their own final
    /// address, which isn't fixed until this value stops moving. Call
    /// [`init`](Self::init) exactly once, after placing the allocator at its
    /// permanent location (e.g. in a `static`), before calling any other
    /// method.
    pub const fn new(provider: P, diag: D, order_min: u32) -> Self {
        assert!(
            (1usize << order_min) >= HEADER_SIZE + 2 * core::mem::size_of::<usize>(),
            "order_min too small: MIN_BLOCK_SIZE must fit a header plus two free-list links"
        );
        Self {
            provider,
            diag,
            free_lists: FreeListRegistry::new(),
            order_min,
            last_error: LastError::new(),
        }
    }

    /// Make every free list empty. Idempotent; must run before any other
    /// method, and must not run again after the allocator has moved.
    pub fn init(&mut self) {
        self.free_lists.init();
    }

    /// The last domain error recorded, without clearing it.
    pub fn peek_error(&self) -> Option<AllocError> {
        self.last_error.peek()
    }

    /// The last domain error recorded, clearing it.
    pub fn take_error(&self) -> Option<AllocError> {
        self.last_error.take()
    }

    fn order_max(&self) -> u32 {
        self.order_min + N as u32
    }

    fn min_block_size(&self) -> usize {
        1usize << self.order_min
    }

    /// `MAX_BLOCK_SIZE - H`: the largest payload size `allocate` will serve.
    pub fn max_payload(&self) -> usize {
        (1usize << (self.order_max() - 1)) - HEADER_SIZE
    }

    /// The current base address of the managed heap region.
    pub fn heap_start(&self) -> usize {
        self.provider.heap_start()
    }

    /// One past the current end of the managed heap region.
    pub fn heap_end(&self) -> usize {
        self.provider.heap_end()
    }

    /// Request the address of `H`, the raw header preceding payload pointer
    /// `p`. Does not validate it.
    fn header_of(p: *mut u8) -> usize {
        p as usize - HEADER_SIZE
    }

    /// Reject any header that could not have been produced by this allocator
    /// for a block currently on loan to a caller.
    unsafe fn is_invalid_pointer(&self, header_addr: usize) -> bool {
        let heap_start = self.heap_start();
        let heap_end = self.heap_end();

        if header_addr < heap_start || header_addr >= heap_end {
            return true;
        }
        if (header_addr - heap_start) % HEADER_SIZE != 0 {
            return true;
        }

        let header = unsafe { Header::from_bits((header_addr as *const u64).read()) };
        let order = header.order() as u32;
        if order < self.order_min || order >= self.order_max() {
            return true;
        }
        if !header.allocated() {
            return true;
        }
        let rsize = header.rsize() as usize;
        if header.padded() != is_padded(rsize, order) {
            return true;
        }
        if order_of(rsize, HEADER_SIZE, self.min_block_size()) != order {
            return true;
        }
        false
    }

    /// Corruption/misuse is fatal: narrate through the diagnostics sink,
    /// then terminate. Kept out of `last_error` deliberately: it is not a
    /// recoverable condition.
    fn abort_on_corruption(&mut self, what: &str) -> ! {
        trace!(self.diag, "buddy-alloc: aborting, {}", what);
        panic!("buddy-alloc: {}", what);
    }

    fn find_fit(&self, order: u32) -> Option<usize> {
        let from = (order - self.order_min) as usize;
        self.free_lists
            .find_fit(from)
            .map(|node| node as usize - HEADER_SIZE)
    }

    /// Pull one more `MAX_BLOCK_SIZE` chunk from the provider and seed it
    /// onto the tail of the top free list.
    fn grow_heap(&mut self) -> Option<usize> {
        let base = unsafe { self.provider.heap_extend() }?;
        let top_order = self.order_max() - 1;
        let header = Header::new().with_allocated(false).with_order(top_order as u8);
        unsafe {
            (base as *mut u64).write(header.into_bits());
            let node = (base + HEADER_SIZE) as *mut Node;
            self.free_lists
                .insert_tail((top_order - self.order_min) as usize, node);
        }
        trace!(self.diag, "buddy-alloc: grew heap by one top-order chunk at {:#x}", base);
        Some(base)
    }

    /// Unlink `block` from its list, split it down to `target`,
    /// and return its (now-shrunk) base address. The caller stamps the
    /// final header.
    fn place(&mut self, block: usize, target: u32) -> usize {
        let header = unsafe { Header::from_bits((block as *const u64).read()) };
        let from_order = header.order() as u32;
        unsafe {
            self.free_lists.remove((block + HEADER_SIZE) as *mut Node);
            if from_order > target {
                split(&mut self.free_lists, self.order_min, HEADER_SIZE, block, from_order, target);
            }
        }
        block
    }

    /// Return a fresh payload pointer of at least `rsize` bytes, or
    /// null with `last_error` set to a domain error.
    pub fn allocate(&mut self, rsize: usize) -> *mut u8 {
        debug_assert!(self.free_lists.is_initialized());

        if rsize == 0 || rsize > self.max_payload() {
            self.last_error.set(AllocError::InvalidArgument);
            return core::ptr::null_mut();
        }

        let k = order_of(rsize, HEADER_SIZE, self.min_block_size());
        let block = match self.find_fit(k) {
            Some(block) => block,
            None => match self.grow_heap() {
                Some(block) => block,
                None => {
                    self.last_error.set(AllocError::OutOfMemory);
                    return core::ptr::null_mut();
                }
            },
        };

        let placed = self.place(block, k);
        let padded = is_padded(rsize, k);
        let header = Header::new()
            .with_allocated(true)
            .with_order(k as u8)
            .with_rsize(rsize as u64)
            .with_padded(padded);
        unsafe { (placed as *mut u64).write(header.into_bits()) };
        (placed + HEADER_SIZE) as *mut u8
    }

    /// Tolerates a null `p`; aborts on a corrupt or foreign header.
    ///
    /// # Safety
    /// `p` must either be null or a pointer previously returned by
    /// `allocate`/`reallocate` on this same allocator, not yet freed.
    pub unsafe fn free(&mut self, p: *mut u8) {
        debug_assert!(self.free_lists.is_initialized());
        if p.is_null() {
            return;
        }

        let header_addr = Self::header_of(p);
        if unsafe { self.is_invalid_pointer(header_addr) } {
            self.abort_on_corruption("invalid pointer passed to free");
        }

        let header = unsafe { Header::from_bits((header_addr as *const u64).read()) };
        let order = header.order() as u32;
        let freed = Header::new().with_allocated(false).with_order(order as u8);
        unsafe {
            (header_addr as *mut u64).write(freed.into_bits());
            self.free_lists
                .insert((order - self.order_min) as usize, (header_addr + HEADER_SIZE) as *mut Node);
            coalesce(
                &mut self.free_lists,
                self.heap_start(),
                self.heap_end(),
                self.order_min,
                self.order_max(),
                HEADER_SIZE,
                header_addr,
            );
        }
    }

    /// Grows, shrinks, or resizes in place depending on how the new size
    /// class compares to the current one.
    ///
    /// # Safety
    /// `p` must either be null or a pointer previously returned by
    /// `allocate`/`reallocate` on this same allocator, not yet freed.
    pub unsafe fn reallocate(&mut self, p: *mut u8, rsize: usize) -> *mut u8 {
        debug_assert!(self.free_lists.is_initialized());

        if p.is_null() {
            return self.allocate(rsize);
        }
        if rsize == 0 {
            unsafe { self.free(p) };
            return core::ptr::null_mut();
        }
        if rsize > self.max_payload() {
            self.last_error.set(AllocError::InvalidArgument);
            return core::ptr::null_mut();
        }

        let header_addr = Self::header_of(p);
        if unsafe { self.is_invalid_pointer(header_addr) } {
            self.abort_on_corruption("invalid pointer passed to reallocate");
        }

        let header = unsafe { Header::from_bits((header_addr as *const u64).read()) };
        let old_order = header.order() as u32;
        let new_order = order_of(rsize, HEADER_SIZE, self.min_block_size());

        if new_order == old_order {
            let padded = is_padded(rsize, old_order);
            let updated = header.with_rsize(rsize as u64).with_padded(padded);
            unsafe { (header_addr as *mut u64).write(updated.into_bits()) };
            return p;
        }

        if new_order > old_order {
            let q = self.allocate(rsize);
            if q.is_null() {
                return core::ptr::null_mut();
            }
            // Copy the old block's full payload capacity, not just the
            // caller's previous requested size: this is safe because the whole
            // old block is owned, and preserves any trailing bytes the caller
            // may have written past its last requested size.
            let old_capacity = (1usize << old_order) - HEADER_SIZE;
            unsafe { core::ptr::copy_nonoverlapping(p, q, old_capacity) };
            unsafe { self.free(p) };
            return q;
        }

        unsafe {
            split(&mut self.free_lists, self.order_min, HEADER_SIZE, header_addr, old_order, new_order);
        }
        let padded = is_padded(rsize, new_order);
        let updated = Header::new()
            .with_allocated(true)
            .with_order(new_order as u8)
            .with_rsize(rsize as u64)
            .with_padded(padded);
        unsafe { (header_addr as *mut u64).write(updated.into_bits()) };
        p
    }
}
