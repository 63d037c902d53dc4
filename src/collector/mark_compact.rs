//! Four-phase compacting collector, Lisp2-style: mark, compute locations,
//! update references, relocate.
//!
//! The first two phases (mark, compute locations) come straight from the
//! source design. The last two — fixing up every pointer word to its
//! post-compaction target, then sliding every live block down to its new
//! address — exist only as an algorithm description in the source; there
//! is no reference implementation to port. They are authored here directly
//! from that description.

use std::collections::HashMap;

use super::{mark_reachable, Collector, RootsFn, Stats, STUB_ROOT};
use crate::allocator::Allocator;
use crate::header::{ObjectHeader, HEADER_SIZE};
use crate::heap::Heap;
use crate::value::Value;

/// Maps a block's pre-compaction header address to its post-compaction one.
type ForwardMap = HashMap<u32, u32>;

/// Mark-compact: reclaims like mark-sweep, but also slides every surviving
/// block down to eliminate the resulting fragmentation.
pub struct MarkCompactGC {
    stats: Stats,
    roots_override: Option<Box<RootsFn>>,
}

impl MarkCompactGC {
    /// Creates a collector using the built-in stub root set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stats: Stats::default(),
            roots_override: None,
        }
    }

    /// Creates a collector whose root set is supplied by `roots` instead of
    /// the stub.
    #[must_use]
    pub fn with_roots(roots: impl Fn() -> Vec<u32> + 'static) -> Self {
        Self {
            stats: Stats::default(),
            roots_override: Some(Box::new(roots)),
        }
    }

    /// Lisp2 sliding computation: walks the heap once, assigning every
    /// marked (live) block its new, compacted address.
    ///
    /// `forward` maps a live block's *current* header address to its
    /// post-compaction header address. The output cursor starts at 0, not
    /// at the first payload address like the scan cursor: the compacted
    /// heap must still tile from offset 0 (invariant 2), so the very first
    /// surviving block has to land back at header address 0.
    fn compute_locations(&mut self, heap: &mut Heap) -> ForwardMap {
        let mut forward = ForwardMap::new();
        let mut scan = HEADER_SIZE;
        let mut free = 0u32;
        while scan < heap.size() {
            let header_addr = scan - HEADER_SIZE;
            let mut header = ObjectHeader::from_word(heap.read_word(header_addr));
            let size = u32::from(header.size);
            if header.mark() {
                header.set_mark(false);
                heap.write_word(header_addr, header.to_word());
                forward.insert(header_addr, free);
                free += size + HEADER_SIZE;
            } else {
                // Matches the source description literally: this also
                // counts headers that were already free before this cycle,
                // not just newly-unreachable ones.
                self.stats.reclaimed += 1;
            }
            scan += size + HEADER_SIZE;
        }
        forward
    }

    /// Rewrites every pointer word inside a surviving block to the new,
    /// post-compaction address of whatever it points at.
    ///
    /// Root addresses themselves are not rewritten: the root set is
    /// supplied through an opaque callback (or the built-in stub), not a
    /// mutable slot this collector can write through. Only pointer words
    /// physically stored inside live blocks are fixed up.
    fn update_references(&self, heap: &mut Heap, allocator: &dyn Allocator, forward: &ForwardMap) {
        for &header_addr in forward.keys() {
            let payload = header_addr + HEADER_SIZE;
            for word_addr in allocator.get_pointers(heap, payload) {
                let target = Value::from_raw(heap.read_word(word_addr)).decode();
                if target < HEADER_SIZE || target >= heap.size() {
                    continue;
                }
                let target_header_addr = target - HEADER_SIZE;
                if let Some(&new_header_addr) = forward.get(&target_header_addr) {
                    let new_payload = new_header_addr + HEADER_SIZE;
                    heap.write_word(word_addr, Value::pointer(new_payload).to_int());
                }
            }
        }
    }

    /// Sliding copy: moves every live block to its recorded forward
    /// address, in increasing original-address order so that blocks never
    /// need to slide past one another. Each block is read into an owned
    /// buffer before being written back, so the (possibly overlapping)
    /// move is safe regardless of direction.
    fn relocate(&self, heap: &mut Heap, forward: &ForwardMap) -> u32 {
        let mut addrs: Vec<u32> = forward.keys().copied().collect();
        addrs.sort_unstable();

        let mut end_of_live = 0u32;
        for old_header_addr in addrs {
            let new_header_addr = forward[&old_header_addr];
            let header = ObjectHeader::from_word(heap.read_word(old_header_addr));
            let block_len = HEADER_SIZE + u32::from(header.size);

            let bytes = heap.read_bytes(old_header_addr, block_len);
            heap.write_bytes(new_header_addr, &bytes);
            end_of_live = new_header_addr + block_len;
        }
        end_of_live
    }
}

impl Default for MarkCompactGC {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for MarkCompactGC {
    fn init(&mut self, allocator: &dyn Allocator) {
        self.stats = Stats {
            total: allocator.object_count(),
            alive: 0,
            reclaimed: 0,
        };
    }

    fn get_roots(&self) -> Vec<u32> {
        self.roots_override
            .as_ref()
            .map_or_else(|| vec![STUB_ROOT], |roots| roots())
    }

    fn collect(&mut self, heap: &mut Heap, allocator: &mut dyn Allocator) -> Stats {
        self.init(allocator);
        log::debug!("mark-compact: starting cycle, total={}", self.stats.total);

        self.stats.alive = mark_reachable(heap, allocator, self.get_roots());
        let forward = self.compute_locations(heap);
        self.update_references(heap, allocator, &forward);
        let end_of_live = self.relocate(heap, &forward);

        if end_of_live < heap.size() {
            let tail_size = heap.size() - end_of_live - HEADER_SIZE;
            heap.write_word(end_of_live, ObjectHeader::free(tail_size as u16).to_word());
        }
        allocator.rebuild(heap);

        log::debug!(
            "mark-compact: finished, alive={}, reclaimed={}",
            self.stats.alive,
            self.stats.reclaimed
        );
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SingleFreeListAllocator;

    #[test]
    fn compacts_unreachable_blocks_away() {
        let mut heap = Heap::new(32);
        let mut allocator = SingleFreeListAllocator::new(&mut heap);

        let p1 = allocator.allocate(&mut heap, 4).to_int();
        let p2 = allocator.allocate(&mut heap, 4).to_int();
        let _p3 = allocator.allocate(&mut heap, 4).to_int();
        let _p4 = allocator.allocate(&mut heap, 4).to_int();
        heap.write_word(p1, Value::pointer(p2).to_int());

        let mut gc = MarkCompactGC::new();
        let stats = gc.collect(&mut heap, &mut allocator);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.alive, 2);
        assert_eq!(allocator.object_count(), 2);
    }

    #[test]
    fn surviving_blocks_slide_to_low_addresses() {
        let mut heap = Heap::new(40);
        let mut allocator = SingleFreeListAllocator::new(&mut heap);

        let _p1 = allocator.allocate(&mut heap, 4).to_int();
        let p2 = allocator.allocate(&mut heap, 4).to_int();
        let _p3 = allocator.allocate(&mut heap, 4).to_int();

        let mut gc = MarkCompactGC::with_roots(move || vec![p2]);
        gc.collect(&mut heap, &mut allocator);

        // p2 is the only survivor; it must have slid down to the heap's
        // very first payload slot.
        assert_eq!(allocator.object_count(), 1);
        assert!(allocator.get_header(&heap, 4).used);
    }

    #[test]
    fn reference_fix_up_tracks_the_moved_target() {
        let mut heap = Heap::new(40);
        let mut allocator = SingleFreeListAllocator::new(&mut heap);

        let p1 = allocator.allocate(&mut heap, 4).to_int();
        let _dead = allocator.allocate(&mut heap, 4).to_int();
        let p3 = allocator.allocate(&mut heap, 4).to_int();
        heap.write_word(p1, Value::pointer(p3).to_int());

        let mut gc = MarkCompactGC::with_roots(move || vec![p1]);
        gc.collect(&mut heap, &mut allocator);

        // p1 slides to address 4; its payload word must now point at
        // wherever p3 ended up, not at p3's old (stale) address.
        let new_p1 = 4;
        let rewritten_target = Value::from_raw(heap.read_word(new_p1)).decode();
        assert_ne!(rewritten_target, p3);
        assert!(allocator.get_header(&heap, rewritten_target).used);
    }
}
