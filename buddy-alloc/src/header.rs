//! The in-band block header: `allocated`/`padded`/`order`/`rsize`, bit-packed
//! into eight bytes at the low address of every block, free or allocated.
use bitfield_struct::bitfield;

/// `H`: the size, and required alignment, of every block header.
///
/// Also the minimum extra space a free block needs immediately after its
/// header for the [`buddy_list::Node`] overlay (two pointers), which is why
/// `MIN_BLOCK_SIZE` must be at least `HEADER_SIZE + 2 * size_of::<usize>()`
/// on the platform `buddy-alloc` is built for — `BuddyAllocator::new`
/// asserts this.
pub const HEADER_SIZE: usize = core::mem::size_of::<u64>();

/// The in-band block header.
///
/// Bit-packed into a single `u64` occupying the first [`HEADER_SIZE`] bytes
/// of every block. A free block's header has `allocated == false`; its
/// `order`/`rsize`/`padded` bits other than `order` are not meaningful, and
/// the bytes immediately following the header instead hold a
/// [`buddy_list::Node`]'s `prev`/`next` links.
#[bitfield(u64)]
pub struct Header {
    /// Set while the block is issued to a caller; clear while on a free list.
    pub allocated: bool,
    /// `rsize + HEADER_SIZE != 2^order`, i.e. the block has trailing slack
    /// beyond what the caller asked for. Meaningful only when `allocated`.
    pub padded: bool,
    /// This block's order: it spans `2^order` bytes.
    #[bits(6)]
    pub order: u8,
    /// The caller-requested payload size. Meaningful only when `allocated`.
    #[bits(56)]
    pub rsize: u64,
}

/// Whether a block of the given `order` holding `rsize` requested bytes has
/// trailing slack, i.e. `rsize + HEADER_SIZE != 2^order`.
pub fn is_padded(rsize: usize, order: u32) -> bool {
    (rsize + HEADER_SIZE) as u64 != (1u64 << order)
}
