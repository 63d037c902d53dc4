//! End-to-end replay of the worked allocation/collection scenarios, driven
//! through [`MemoryManager`] rather than against the allocator directly.

use mmgc::{Heap, MarkSweepGC, MemoryManager, SingleFreeListAllocator, Value};

fn manager_with_gc(size: u32) -> MemoryManager {
    let mut heap = Heap::new(size);
    let allocator = SingleFreeListAllocator::new(&mut heap);
    MemoryManager::new(heap, Box::new(allocator), Some(Box::new(MarkSweepGC::new())))
}

#[test]
fn heap_dump_shape_for_a_fresh_heap() {
    let _ = env_logger::builder().is_test(true).try_init();

    let heap = Heap::new(32);
    let dump = heap.dump();
    assert!(dump.starts_with("0x00000000 : 1C 00 00 00\n"));
    for line in dump.lines().skip(1) {
        if line.is_empty() {
            continue;
        }
        assert!(line.ends_with("00 00 00 00"), "unexpected nonzero byte: {line}");
    }
}

#[test]
fn allocate_write_collect_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut mm = manager_with_gc(32);

    let p1 = mm.allocate(4);
    let p2 = mm.allocate(4);
    let _p3 = mm.allocate(4);
    let _p4 = mm.allocate(4);
    assert_eq!(mm.object_count(), 4);

    mm.write_value(p1.to_int(), Value::pointer(p2.to_int()));

    let stats = mm.collect().expect("collector is configured");
    assert_eq!(stats.total, 4);
    assert_eq!(stats.alive, 2);
    assert_eq!(stats.reclaimed, 2);
    assert_eq!(mm.object_count(), 2);
}

#[test]
fn write_barrier_runs_before_each_store_in_order() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut mm = manager_with_gc(32);
    let recorded: Rc<RefCell<Vec<(u32, u32)>>> = Rc::new(RefCell::new(Vec::new()));

    let p = mm.allocate(4).to_int();
    mm.write_value(p, Value::pointer(0));

    let recorded_for_barrier = Rc::clone(&recorded);
    mm.set_write_barrier(move |addr, new_value| {
        recorded_for_barrier.borrow_mut().push((addr, new_value.to_int()));
    });

    // The barrier only sees the value about to be written; observing the
    // value it is about to replace is the caller's job, done here via
    // `read_value` before each store.
    let before_first = mm.read_value(p).to_int();
    mm.write_value(p, Value::pointer(8));
    let before_second = mm.read_value(p).to_int();
    mm.write_value(p, Value::pointer(12));

    assert_eq!(before_first, 0);
    assert_eq!(before_second, 8);
    assert_eq!(recorded.borrow().len(), 2);
    assert_eq!(recorded.borrow()[0].1, 8);
    assert_eq!(recorded.borrow()[1].1, 12);
}

#[test]
fn oom_is_a_null_pointer_not_a_panic() {
    let mut mm = manager_with_gc(32);
    mm.allocate(20);
    let failed = mm.allocate(20);
    assert!(failed.is_null_pointer());
}

#[test]
fn freeing_twice_is_a_silent_no_op() {
    let mut mm = manager_with_gc(32);
    let p = mm.allocate(8).to_int();
    mm.free(p);
    assert_eq!(mm.object_count(), 0);
    mm.free(p);
    assert_eq!(mm.object_count(), 0);
}
