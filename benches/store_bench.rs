//! Store benchmarks
//!
//! Add and get of string, integer and object values, plus concurrent puts.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;
use shardlog::{HasherKind, Store, StoreConfig};
use std::sync::Arc;

const PREFILL: usize = 10_000;

fn store(hasher: HasherKind) -> Store {
    Store::new(&StoreConfig {
        hasher,
        ..StoreConfig::default()
    })
    .unwrap()
}

fn encoded(i: usize, kind: &str) -> Vec<u8> {
    let value = match kind {
        "string" => json!(format!("solo{}", i)),
        "int" => json!(i),
        _ => json!({"a": format!("test{}", i), "b": format!("test{}", i)}),
    };
    serde_json::to_vec(&value).unwrap()
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for kind in ["string", "int", "complex"] {
        for hasher in [HasherKind::Xxh32, HasherKind::Fnv1a] {
            let store = store(hasher);
            let mut i = 0usize;
            group.bench_function(format!("{}/{:?}", kind, hasher), |b| {
                b.iter(|| {
                    let key = i.to_string();
                    store.put(&key, encoded(i, kind)).unwrap();
                    i += 1;
                })
            });
        }
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for kind in ["string", "int", "complex"] {
        let store = store(HasherKind::default());
        for i in 0..PREFILL {
            store.put(&i.to_string(), encoded(i, kind)).unwrap();
        }

        let mut i = 0usize;
        group.bench_function(kind, |b| {
            b.iter(|| {
                let key = (i % PREFILL).to_string();
                black_box(store.get(&key).unwrap());
                i += 1;
            })
        });
    }

    group.finish();
}

fn bench_concurrent_put(c: &mut Criterion) {
    let threads = num_cpus::get().clamp(2, 8);

    c.bench_function(&format!("concurrent_put/{}_threads", threads), |b| {
        b.iter_batched(
            || Arc::new(store(HasherKind::default())),
            |store| {
                std::thread::scope(|s| {
                    for t in 0..threads {
                        let store = &store;
                        s.spawn(move || {
                            for i in 0..1_000 {
                                store.put(&format!("{}-{}", t, i), encoded(i, "string")).unwrap();
                            }
                        });
                    }
                });
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_add, bench_get, bench_concurrent_put);
criterion_main!(benches);
