//! Performance benchmarks for the observable store.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use observable_store::{Mutation, Observer, Store, SubscriptionConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Benchmark writes with varying observer counts
fn bench_set_with_observers(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_with_observers");

    for observer_count in [0, 1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::new("observers", observer_count),
            &observer_count,
            |b, &count| {
                let store: Store<u64, u64> = Store::new();
                let sum = Arc::new(AtomicU64::new(0));

                for _ in 0..count {
                    let sum = Arc::clone(&sum);
                    store
                        .observe(&Observer::new(move |m: &Mutation<u64, u64>| {
                            sum.fetch_add(*m.key(), Ordering::Relaxed);
                        }))
                        .unwrap();
                }

                let mut i = 0u64;
                b.iter(|| {
                    store.set(i % 1024, i).unwrap();
                    i += 1;
                });
                black_box(sum.load(Ordering::Relaxed));
            },
        );
    }

    group.finish();
}

/// Benchmark reads on a populated store
fn bench_get(c: &mut Criterion) {
    let store: Store<u64, String> = Store::new();
    for i in 0..10_000 {
        store.set(i, format!("value-{}", i)).unwrap();
    }

    c.bench_function("get_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&(i % 10_000)));
            i += 1;
        });
    });

    c.bench_function("get_miss", |b| {
        b.iter(|| black_box(store.get(&u64::MAX)));
    });
}

/// Benchmark set + delete cycles feeding a subscription
fn bench_subscription_churn(c: &mut Criterion) {
    c.bench_function("set_delete_subscribed", |b| {
        let store: Store<u64, u64> = Store::new();
        let subscription = store
            .subscribe(SubscriptionConfig {
                buffer_size: 4,
                ..Default::default()
            })
            .unwrap();

        b.iter(|| {
            store.set(1, 1).unwrap();
            store.delete(&1).unwrap();
            black_box(subscription.drain());
        });
    });
}

criterion_group!(
    benches,
    bench_set_with_observers,
    bench_get,
    bench_subscription_churn
);
criterion_main!(benches);
