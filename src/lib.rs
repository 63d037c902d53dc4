//! A small flat-heap memory manager with a swappable allocator and garbage
//! collector, built for teaching.
//!
//! This crate provides a single type called [`MemoryManager`]. It owns a
//! fixed-size, zero-initialized virtual heap (a plain byte buffer addressed
//! by 32-bit offsets, not by host pointers), an [`Allocator`] that carves
//! blocks out of that heap, and optionally a [`Collector`] that traces and
//! reclaims unreachable ones. Every word that lives in the heap — a payload
//! slot or a root — is a tagged [`Value`]: a number, a pointer, or a
//! boolean, distinguished purely by its bit pattern (see [`value`] for the
//! encoding).
//!
//! # Usage
//! ```
//! use mmgc::{Heap, MemoryManager, SingleFreeListAllocator, Value};
//!
//! let mut heap = Heap::new(256);
//! let allocator = SingleFreeListAllocator::new(&mut heap);
//! let mut mm = MemoryManager::new(heap, Box::new(allocator), None);
//!
//! let p = mm.allocate(8);
//! mm.write_value(p.to_int(), Value::pointer(0));
//! mm.free(p.to_int());
//! ```
//! To collect garbage, construct with a [`MarkSweepGC`] or [`MarkCompactGC`]
//! in the third argument instead of `None`, and call
//! [`MemoryManager::collect`].
//!
//! # Implementation
//! The heap is one machine word (4 bytes) of inline header per block,
//! immediately followed by the block's payload:
//! ```text
//! 0x00000000 : 1C 00 00 00
//! ^---------   ^- size = 28, used = false, gc = 0
//! ```
//! The sole allocator, [`SingleFreeListAllocator`], is a first-fit,
//! split-on-surplus allocator over a single insertion-ordered free list —
//! the same shape as a classic linear-scan embedded allocator, minus its
//! right-coalescing step (dropped deliberately; see the allocator's own
//! docs for why). Two collectors are provided: [`MarkSweepGC`], a
//! worklist-mark-then-linear-sweep tracer, and [`MarkCompactGC`], which
//! additionally slides surviving blocks down to eliminate fragmentation
//! (Lisp2-style: mark, compute new locations, fix up references, relocate).
//!
//! Every potentially-failing operation distinguishes two kinds of failure:
//! conditions representable in-band (allocation failure is the null
//! pointer, a double free is a silent no-op) are not errors at all; only
//! genuine misuse (pointer arithmetic on a non-pointer value, calling
//! [`MemoryManager::collect`] with no collector configured) surfaces as
//! [`MemoryManagerError`].

mod allocator;
mod collector;
mod error;
mod header;
mod heap;
mod memory_manager;
mod value;

pub use allocator::{Allocator, SingleFreeListAllocator};
pub use collector::{Collector, MarkCompactGC, MarkSweepGC, RootsFn, Stats};
pub use error::MemoryManagerError;
pub use header::{ObjectHeader, HEADER_SIZE};
pub use heap::Heap;
pub use memory_manager::{MemoryManager, WriteBarrier};
pub use value::{Value, ValueType, WORD_SIZE};
