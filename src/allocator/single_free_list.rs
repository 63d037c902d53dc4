//! The concrete, singly-ordered free-list allocator.
//!
//! This is the only allocator implementation in the crate. Its algorithm,
//! in four steps:
//! 1.  A fresh heap is a single free block spanning everything past its one
//!     header.
//! 2.  `allocate(n)` rounds `n` up to a multiple of 4, then walks the free
//!     list in insertion order looking for the first block big enough
//!     (first-fit). If the block has room left over for another header
//!     plus at least one payload word, it is split: the front becomes the
//!     used block, the remainder becomes a new free block appended to the
//!     free list.
//! 3.  `free(addr)` flips the block back to free and appends its header
//!     address to the free list. It does **not** look at neighboring
//!     blocks — no coalescing.
//! 4.  Freeing an already-free block is a no-op rather than an error: there
//!     is no reliable way to distinguish "user error" from "collector
//!     reclaiming something already reclaimed" at this layer, so both are
//!     treated the same.
//!
//! The lack of coalescing is a deliberate simplification, not an oversight:
//! it keeps `free` O(1) instead of requiring either a sorted free list or a
//! boundary-tag scan. Heaps that cycle through many alloc/free patterns
//! will fragment over time; that is an accepted cost in this design.

use super::Allocator;
use crate::header::{ObjectHeader, HEADER_SIZE};
use crate::heap::Heap;
use crate::value::Value;

/// First-fit allocator backed by a single, insertion-ordered free list.
pub struct SingleFreeListAllocator {
    free_list: Vec<u32>,
    live_count: u32,
}

impl SingleFreeListAllocator {
    /// Creates an allocator and installs its initial free block into
    /// `heap`, which is reset as a side effect.
    #[must_use]
    pub fn new(heap: &mut Heap) -> Self {
        let mut allocator = Self {
            free_list: Vec::new(),
            live_count: 0,
        };
        Allocator::reset(&mut allocator, heap);
        allocator
    }

    /// Rounds `n` up to the next multiple of 4.
    fn align_up(n: u32) -> u32 {
        (n.wrapping_sub(1) & !3u32).wrapping_add(4)
    }
}

impl Allocator for SingleFreeListAllocator {
    fn allocate(&mut self, heap: &mut Heap, n: u32) -> Value {
        let n = Self::align_up(n);

        let Some(pos) = self
            .free_list
            .iter()
            .position(|&f| u32::from(self.get_header(heap, f).size) >= n)
        else {
            log::debug!("allocate({n}): no free block large enough");
            return Value::null();
        };
        let header_addr = self.free_list.remove(pos);

        let mut header = self.get_header(heap, header_addr);
        let size = u32::from(header.size);
        header.used = true;

        let payload = header_addr + HEADER_SIZE;
        if size >= n + 2 * HEADER_SIZE {
            header.size = n as u16;
            heap.write_word(header_addr, header.to_word());

            let tail_addr = payload + n;
            let tail_size = size - n - HEADER_SIZE;
            heap.write_word(tail_addr, ObjectHeader::free(tail_size as u16).to_word());
            self.free_list.push(tail_addr);
            log::trace!("allocate({n}): split block at {header_addr}, tail {tail_addr} size {tail_size}");
        } else {
            heap.write_word(header_addr, header.to_word());
        }

        self.live_count += 1;
        Value::pointer(payload)
    }

    fn free(&mut self, heap: &mut Heap, addr: u32) {
        let header_addr = addr - HEADER_SIZE;
        let mut header = self.get_header(heap, header_addr);
        if !header.used {
            log::warn!("free({addr}): already free, ignoring");
            return;
        }
        header.used = false;
        heap.write_word(header_addr, header.to_word());
        self.free_list.push(header_addr);
        self.live_count -= 1;
    }

    fn reset(&mut self, heap: &mut Heap) {
        heap.reset();
        self.free_list.clear();
        self.live_count = 0;
        let initial_size = (heap.size() - HEADER_SIZE) as u16;
        heap.write_word(0, ObjectHeader::free(initial_size).to_word());
        self.free_list.push(0);
    }

    fn get_header(&self, heap: &Heap, addr: u32) -> ObjectHeader {
        ObjectHeader::from_word(heap.read_word(addr - HEADER_SIZE))
    }

    fn object_count(&self) -> u32 {
        self.live_count
    }

    fn get_pointers(&self, heap: &Heap, addr: u32) -> Vec<u32> {
        let header = self.get_header(heap, addr);
        let words = u32::from(header.size) / 4;
        (0..words)
            .map(|i| addr + i * 4)
            .filter(|&word_addr| Value::from_raw(heap.read_word(word_addr)).is_pointer())
            .collect()
    }

    fn rebuild(&mut self, heap: &Heap) {
        self.free_list.clear();
        self.live_count = 0;
        let mut scan = HEADER_SIZE;
        while scan < heap.size() {
            let header_addr = scan - HEADER_SIZE;
            let header = ObjectHeader::from_word(heap.read_word(header_addr));
            if header.used {
                self.live_count += 1;
            } else {
                self.free_list.push(header_addr);
            }
            scan += u32::from(header.size) + HEADER_SIZE;
        }
    }
}
