use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_collections::AvlTreeMap;

const N: i32 = 10_000;

fn random_values(n: i32) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..n).map(|_| rng.gen()).collect()
}

fn benchmark_insert(c: &mut Criterion) {
    let values = random_values(N);
    c.bench_function("map_insert", |b| {
        b.iter_batched(
            || values.clone(),
            |values| {
                let mut map = AvlTreeMap::new();
                for value in values {
                    map.insert(value, value);
                }
                map
            },
            BatchSize::SmallInput,
        )
    });
}

fn benchmark_get(c: &mut Criterion) {
    let values = random_values(N);
    let map: AvlTreeMap<i32, i32> = values.iter().map(|&v| (v, v)).collect();
    c.bench_function("map_get", |b| {
        b.iter(|| {
            for value in &values {
                black_box(map.get(value));
            }
        })
    });
}

fn benchmark_iter(c: &mut Criterion) {
    let map: AvlTreeMap<i32, i32> = random_values(N).into_iter().map(|v| (v, v)).collect();
    c.bench_function("map_iter", |b| {
        b.iter(|| {
            for pair in &map {
                black_box(pair);
            }
        })
    });
}

fn benchmark_remove(c: &mut Criterion) {
    let values = random_values(N);
    let map: AvlTreeMap<i32, i32> = values.iter().map(|&v| (v, v)).collect();
    c.bench_function("map_remove", |b| {
        b.iter_batched(
            || map.clone(),
            |mut map| {
                for value in &values {
                    map.remove(value);
                }
                map
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_iter,
    benchmark_remove
);
criterion_main!(benches);
