// ••• ALARM: the SOS memory allocator
// --- by Eliza Weisman (eliza@elizas.website)
// ••• and the SOS contributors
//
//  Copyright (c) 2018 Eliza Weisman
//  Released under the terms of the MIT license. See `LICENSE` in the root
//  directory of this repository for more information.
//
//! Base types shared by the ALARM buddy allocator.
//!
//! This crate holds everything the allocator core (`buddy-alloc`) treats as
//! an external collaborator rather than something it owns: the heap
//! provider that hands out backing memory, the diagnostics sink that
//! receives debug narration, and the categorical last-error channel that
//! replaces `errno` for a `no_std` allocator.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod diag;
pub mod error;
pub mod heap;

pub use diag::{DiagnosticsSink, NullSink};
pub use error::{AllocError, LastError};
pub use heap::{FixedHeap, HeapProvider};
