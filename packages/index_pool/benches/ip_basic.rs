//! Basic benchmarks for the `index_pool` crate, comparing the segmented and contiguous pools.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use index_pool::{ArrayPool, IndexPool, Pool};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

/// Number of items touched by the batch benchmarks.
const BATCH: usize = 10_000;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    bench_pool(c, &allocs, "index_pool", IndexPool::<TestItem>::new);
    bench_pool(c, &allocs, "array_pool", ArrayPool::<TestItem>::new);

    allocs.print_to_stdout();
}

fn bench_pool<P, F>(c: &mut Criterion, allocs: &alloc_tracker::Session, name: &str, new_pool: F)
where
    P: Pool<TestItem>,
    F: Fn() -> P + Copy,
{
    let mut group = c.benchmark_group(name);

    let mut allocs_op = allocs.operation(format!("{name}/allocate_first"));
    group.bench_function("allocate_first", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(new_pool)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                *black_box(pool.allocate()).1 = black_box(TEST_VALUE);
            }

            start.elapsed()
        });
    });

    let mut allocs_op = allocs.operation(format!("{name}/allocate_10k"));
    group.bench_function("allocate_10k", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(new_pool)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                for _ in 0..BATCH {
                    *black_box(pool.allocate()).1 = black_box(TEST_VALUE);
                }
            }

            start.elapsed()
        });
    });

    let mut allocs_op = allocs.operation(format!("{name}/churn_10k"));
    group.bench_function("churn_10k", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(new_pool)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            // Pre-warm each pool so that churn reuses released indices.
            let index_sets = pools
                .iter_mut()
                .map(|pool| {
                    iter::repeat_with(|| pool.allocate().0)
                        .take(BATCH)
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for (pool, index_set) in pools.iter_mut().zip(&index_sets) {
                for &index in index_set.iter().step_by(2) {
                    pool.release(index);
                }

                for _ in index_set.iter().step_by(2) {
                    *black_box(pool.allocate()).1 = black_box(TEST_VALUE);
                }
            }

            start.elapsed()
        });
    });

    let mut allocs_op = allocs.operation(format!("{name}/read_10k"));
    group.bench_function("read_10k", |b| {
        let mut pool = new_pool();
        let indices = iter::repeat_with(|| pool.allocate().0)
            .take(BATCH)
            .collect::<Vec<_>>();

        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                for &index in &indices {
                    _ = black_box(pool.get(black_box(index)));
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}
