//! The collector capability set and its concrete tracing collectors.

mod mark_compact;
mod mark_sweep;

pub use mark_compact::MarkCompactGC;
pub use mark_sweep::MarkSweepGC;

use crate::allocator::Allocator;
use crate::heap::Heap;

/// A snapshot of a completed (or in-progress) collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Total number of blocks present when the cycle started.
    pub total: u32,
    /// Number of blocks found reachable.
    pub alive: u32,
    /// Number of blocks reclaimed this cycle.
    pub reclaimed: u32,
}

/// A function supplying the root set for a collection cycle, in place of
/// the built-in stub.
pub type RootsFn = dyn Fn() -> Vec<u32>;

/// Abstract contract every concrete collector must implement.
///
/// Like [`Allocator`], a collector holds no reference to the heap or
/// allocator it operates over; both are passed into [`Collector::collect`]
/// for the duration of the call.
pub trait Collector {
    /// Resets the stats snapshot to `{ total: allocator.object_count(),
    /// alive: 0, reclaimed: 0 }`.
    fn init(&mut self, allocator: &dyn Allocator);

    /// The root set to start tracing from.
    ///
    /// Without an override installed at construction time, this is a known
    /// stub returning `{4}` — the payload address of the first block. See
    /// the crate documentation for why this stub exists and how to replace
    /// it.
    fn get_roots(&self) -> Vec<u32>;

    /// Runs a full collection cycle and returns the resulting stats.
    fn collect(&mut self, heap: &mut Heap, allocator: &mut dyn Allocator) -> Stats;
}

/// Payload address of the first block — the stub root set's sole member.
pub(crate) const STUB_ROOT: u32 = 4;

/// Shared worklist mark phase used by both [`MarkSweepGC`] and
/// [`MarkCompactGC`]: traces from `roots`, setting the mark bit of every
/// reachable, currently-used block. Returns the number of blocks marked.
///
/// A traced address can be null or otherwise fall before the first header
/// (payload words are zero-initialized, and zero decodes as a pointer per
/// the tagged encoding) — there is no block there, so such addresses are
/// skipped rather than read out of bounds.
pub(crate) fn mark_reachable(
    heap: &mut Heap,
    allocator: &dyn Allocator,
    roots: Vec<u32>,
) -> u32 {
    use crate::header::{ObjectHeader, HEADER_SIZE};
    use crate::value::Value;

    let mut alive = 0;
    let mut worklist = roots;
    while let Some(v) = worklist.pop() {
        if v < HEADER_SIZE || v >= heap.size() {
            continue;
        }
        let header_addr = v - HEADER_SIZE;
        let mut header = ObjectHeader::from_word(heap.read_word(header_addr));
        if header.used && !header.mark() {
            header.set_mark(true);
            heap.write_word(header_addr, header.to_word());
            alive += 1;

            for word_addr in allocator.get_pointers(heap, v) {
                let target = Value::from_raw(heap.read_word(word_addr)).decode();
                worklist.push(target);
            }
        }
    }
    alive
}
