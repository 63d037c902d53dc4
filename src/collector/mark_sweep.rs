//! Two-phase tracing collector using the header's mark bit and the
//! allocator's `free`.

use super::{mark_reachable, Collector, RootsFn, Stats, STUB_ROOT};
use crate::allocator::Allocator;
use crate::header::{ObjectHeader, HEADER_SIZE};
use crate::heap::Heap;

/// Mark-sweep: trace reachable blocks from the roots, then walk the heap
/// linearly reclaiming anything left unmarked.
pub struct MarkSweepGC {
    stats: Stats,
    roots_override: Option<Box<RootsFn>>,
}

impl MarkSweepGC {
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

    fn sweep(&mut self, heap: &mut Heap, allocator: &mut dyn Allocator) {
        let mut scan = HEADER_SIZE;
        while scan < heap.size() {
            let header_addr = scan - HEADER_SIZE;
            let mut header = ObjectHeader::from_word(heap.read_word(header_addr));
            let size = u32::from(header.size);
            if header.mark() {
                header.set_mark(false);
                heap.write_word(header_addr, header.to_word());
            } else if header.used {
                allocator.free(heap, scan);
                self.stats.reclaimed += 1;
            }
            scan += size + HEADER_SIZE;
        }
    }
}

impl Default for MarkSweepGC {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for MarkSweepGC {
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
        log::debug!("mark-sweep: starting cycle, total={}", self.stats.total);
        self.stats.alive = mark_reachable(heap, allocator, self.get_roots());
        self.sweep(heap, allocator);
        log::debug!(
            "mark-sweep: finished, alive={}, reclaimed={}",
            self.stats.alive,
            self.stats.reclaimed
        );
        self.stats
    }
}
