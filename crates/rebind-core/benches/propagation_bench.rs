//! Benchmarks for invalidation fan-out and lazy recomputation.
//!
//! Run with: cargo bench -p rebind-core

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rebind_core::bindings::numeric;
use rebind_core::{Binding, IntegerProperty, NumberExpression, Property, dependency};
use std::hint::black_box;

/// A linear chain `p + 1 + 1 ...` of `depth` bindings.
fn make_chain(depth: usize) -> (IntegerProperty, Binding<i32>) {
    let root = Property::new(0_i32);
    let mut tip = root.add(1_i32);
    for _ in 1..depth {
        tip = tip.add(1_i32);
    }
    (root, tip)
}

fn bench_chain_invalidate_and_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation/chain");

    for depth in [1, 8, 64, 256] {
        let (root, tip) = make_chain(depth);
        let mut next = 0_i32;
        group.bench_with_input(BenchmarkId::new("set_then_get", depth), &depth, |b, _| {
            b.iter(|| {
                next = next.wrapping_add(1);
                root.set(next);
                black_box(tip.get().ok())
            })
        });
    }

    group.finish();
}

fn bench_chain_cached_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation/cached");

    for depth in [8, 256] {
        let (_root, tip) = make_chain(depth);
        tip.get().ok();
        group.bench_with_input(BenchmarkId::new("get", depth), &depth, |b, _| {
            b.iter(|| black_box(tip.get().ok()))
        });
    }

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation/fan_out");

    for width in [4, 64, 512] {
        let root = Property::new(0_i32);
        let leaves: Vec<Binding<i32>> = (0..width)
            .map(|i| numeric::multiply(&root, i32::try_from(i).unwrap_or(0)))
            .collect();
        for leaf in &leaves {
            leaf.get().ok();
        }
        let mut next = 0_i32;
        group.bench_with_input(BenchmarkId::new("set", width), &width, |b, _| {
            b.iter(|| {
                next = next.wrapping_add(1);
                root.set(next);
                for leaf in &leaves {
                    black_box(leaf.get().ok());
                }
            })
        });
    }

    group.finish();
}

fn bench_fan_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation/fan_in");

    for width in [4, 64, 512] {
        let sources: Vec<IntegerProperty> = (0..width).map(|_| Property::new(0_i32)).collect();
        let readers = sources.clone();
        let total = Binding::derived(
            move || Ok(readers.iter().map(Property::get).sum::<i32>()),
            sources.iter().map(dependency),
        );
        let mut next = 0_i32;
        group.bench_with_input(BenchmarkId::new("set_one_get", width), &width, |b, _| {
            b.iter(|| {
                next = next.wrapping_add(1);
                sources[0].set(next);
                black_box(total.get().ok())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_chain_invalidate_and_read,
    bench_chain_cached_read,
    bench_fan_out,
    bench_fan_in
);
criterion_main!(benches);
