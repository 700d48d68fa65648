// ••• ALARM: the SOS memory allocator
// --- by Eliza Weisman (eliza@elizas.website)
// ••• and the SOS contributors
//
//  Copyright (c) 2018 Eliza Weisman
//  Released under the terms of the MIT license. See `LICENSE` in the root
//  directory of this repository for more information.
//
//! A binary buddy-block memory allocator over a fixed, contiguous heap.
//!
//! The heap is supplied and grown by a caller-provided [`HeapProvider`]; this
//! crate owns everything downstream of that: size-class rounding, the
//! per-order [`FreeListRegistry`], the in-band [`Header`] codec, the
//! splitter and coalescer, and the `allocate`/`reallocate`/`free` front-end
//! tied together by [`BuddyAllocator`].
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod allocator;
mod coalescer;
mod header;
mod size_class;
mod splitter;

pub use allocator::BuddyAllocator;
pub use header::{is_padded, Header, HEADER_SIZE};
pub use size_class::{order_of, round_up_size_class};

pub use buddy_base::{AllocError, DiagnosticsSink, FixedHeap, HeapProvider, LastError, NullSink};
pub use buddy_list::{FreeListRegistry, Node};
