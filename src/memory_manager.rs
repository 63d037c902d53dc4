//! The facade tying a [`Heap`], an [`Allocator`], and an optional
//! [`Collector`] together behind one typed API.

use crate::allocator::Allocator;
use crate::collector::{Collector, Stats};
use crate::error::MemoryManagerError;
use crate::header::ObjectHeader;
use crate::heap::Heap;
use crate::value::{Value, ValueType};

/// Callback invoked before every [`MemoryManager::write_value`] store.
///
/// Receives the target address and the value about to be written; it may
/// read the previous value at that address via
/// [`MemoryManager::read_value`], but must not write to `addr` itself
/// (undefined behavior — the same restriction the source callback carries).
pub type WriteBarrier = dyn FnMut(u32, &Value);

/// Owns exactly one [`Heap`], one [`Allocator`], and optionally one
/// [`Collector`] and a write-barrier callback.
pub struct MemoryManager {
    heap: Heap,
    allocator: Box<dyn Allocator>,
    collector: Option<Box<dyn Collector>>,
    write_barrier: Option<Box<WriteBarrier>>,
}

impl MemoryManager {
    /// Builds a manager from its already-constructed parts.
    #[must_use]
    pub fn new(
        heap: Heap,
        allocator: Box<dyn Allocator>,
        collector: Option<Box<dyn Collector>>,
    ) -> Self {
        Self {
            heap,
            allocator,
            collector,
            write_barrier: None,
        }
    }

    /// Installs (or replaces) the write-barrier callback.
    pub fn set_write_barrier(&mut self, barrier: impl FnMut(u32, &Value) + 'static) {
        self.write_barrier = Some(Box::new(barrier));
    }

    /// Removes any installed write-barrier callback.
    pub fn clear_write_barrier(&mut self) {
        self.write_barrier = None;
    }

    /// Allocates at least `n` bytes. Returns the null pointer on OOM.
    pub fn allocate(&mut self, n: u32) -> Value {
        self.allocator.allocate(&mut self.heap, n)
    }

    /// Releases the block at `addr`. A no-op if already free.
    pub fn free(&mut self, addr: u32) {
        self.allocator.free(&mut self.heap, addr);
    }

    /// The header preceding the payload at `addr`.
    #[must_use]
    pub fn get_header(&self, addr: u32) -> ObjectHeader {
        self.allocator.get_header(&self.heap, addr)
    }

    /// Payload size in bytes of the block at `addr`.
    #[must_use]
    pub fn size_of(&self, addr: u32) -> u32 {
        u32::from(self.get_header(addr).size)
    }

    /// Addresses of the pointer-tagged payload words of the block at `addr`.
    #[must_use]
    pub fn get_pointers(&self, addr: u32) -> Vec<u32> {
        self.allocator.get_pointers(&self.heap, addr)
    }

    /// Number of currently-live blocks.
    #[must_use]
    pub fn object_count(&self) -> u32 {
        self.allocator.object_count()
    }

    /// Reads the raw word at `addr`.
    #[must_use]
    pub fn read_word(&self, addr: u32) -> u32 {
        self.heap.read_word(addr)
    }

    /// Writes the raw word `value` at `addr`. Does not invoke the write
    /// barrier.
    pub fn write_word(&mut self, addr: u32, value: u32) {
        self.heap.write_word(addr, value);
    }

    /// Reads the byte at `addr`.
    #[must_use]
    pub fn read_byte(&self, addr: u32) -> u8 {
        self.heap.read_byte(addr)
    }

    /// Writes the byte `value` at `addr`. Does not invoke the write
    /// barrier.
    pub fn write_byte(&mut self, addr: u32, value: u8) {
        self.heap.write_byte(addr, value);
    }

    /// Reads the tagged [`Value`] at `addr`.
    #[must_use]
    pub fn read_value(&self, addr: u32) -> Value {
        Value::from_raw(self.heap.read_word(addr))
    }

    /// Writes `value` at `addr`, invoking the write-barrier callback (if
    /// one is installed) before the store.
    pub fn write_value(&mut self, addr: u32, value: Value) {
        if let Some(barrier) = self.write_barrier.as_mut() {
            barrier(addr, &value);
        }
        self.heap.write_word(addr, value.to_int());
    }

    /// Encodes `raw` as `type_` and stores it at `addr`.
    ///
    /// Unlike [`Self::write_value`], this overload does **not** invoke the
    /// write-barrier callback — preserved deliberately to match the
    /// asymmetry in the source facade.
    ///
    /// # Errors
    /// [`MemoryManagerError::TypeError`] if `raw` is out of domain for
    /// `type_` (see [`Value::encode`]).
    pub fn write_value_raw(
        &mut self,
        addr: u32,
        raw: u32,
        type_: ValueType,
    ) -> Result<(), MemoryManagerError> {
        let value = Value::encode(raw, type_)?;
        self.heap.write_word(addr, value.to_int());
        Ok(())
    }

    /// Runs a full collection cycle.
    ///
    /// # Errors
    /// [`MemoryManagerError::ConfigError`] if no collector was configured.
    pub fn collect(&mut self) -> Result<Stats, MemoryManagerError> {
        let collector = self
            .collector
            .as_mut()
            .ok_or(MemoryManagerError::ConfigError)?;
        Ok(collector.collect(&mut self.heap, self.allocator.as_mut()))
    }

    /// Renders the heap as hex words; see [`Heap::dump`].
    #[must_use]
    pub fn dump(&self) -> String {
        self.heap.dump()
    }

    /// Total heap size in bytes.
    #[must_use]
    pub fn heap_size(&self) -> u32 {
        self.heap.size()
    }
}
