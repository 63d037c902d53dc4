use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mmgc::{Allocator, Heap, SingleFreeListAllocator};

/// Benchmarks repeated allocate/free of a single small block, with the heap
/// pre-loaded with `pre_allocations` unrelated blocks first to show the
/// impact of the free list's linear first-fit scan.
fn benchmark_with_preallocation(c: &mut Criterion, pre_allocations: usize) {
    let mut group = c.benchmark_group("repeated_allocation_deallocation");

    group.bench_with_input(
        BenchmarkId::from_parameter(pre_allocations),
        &pre_allocations,
        |b, &pre_allocations| {
            let mut heap = Heap::new(8192);
            let mut allocator = SingleFreeListAllocator::new(&mut heap);

            for _ in 0..pre_allocations {
                let p = allocator.allocate(&mut heap, 1);
                assert!(!p.is_null_pointer(), "benchmark heap too small for preallocation count");
            }

            let p = allocator.allocate(&mut heap, 1);
            assert!(!p.is_null_pointer());
            allocator.free(&mut heap, p.to_int());

            b.iter(|| {
                let p = allocator.allocate(&mut heap, 1);
                let p = criterion::black_box(p);
                allocator.free(&mut heap, p.to_int());
            });
        },
    );

    group.finish();
}

fn no_memory_usage(c: &mut Criterion) {
    benchmark_with_preallocation(c, 0);
}

fn low_memory_usage(c: &mut Criterion) {
    benchmark_with_preallocation(c, 8);
}

fn medium_memory_usage(c: &mut Criterion) {
    benchmark_with_preallocation(c, 510);
}

fn high_memory_usage(c: &mut Criterion) {
    benchmark_with_preallocation(c, 1020);
}

criterion_group!(
    benches,
    no_memory_usage,
    low_memory_usage,
    medium_memory_usage,
    high_memory_usage
);
criterion_main!(benches);
