use std::{hint::black_box, time::Duration};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use library_catalog::{Catalog, Identifier, OrderedMap};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

const KEYS: i64 = 1_000;

fn custom_criterion() -> Criterion {
    Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(1))
        .warm_up_time(Duration::from_secs(1))
}

fn shuffled_keys() -> Vec<i64> {
    let mut keys: Vec<i64> = (0..KEYS).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(42));
    keys
}

fn build(keys: &[i64]) -> OrderedMap<i64, i64> {
    keys.iter().map(|&k| (k, k)).collect()
}

fn ordered_map_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderedMap Operations");

    let sorted: Vec<i64> = (0..KEYS).collect();
    let shuffled = shuffled_keys();

    // Sorted input degrades the tree to a list
    group.bench_function("insert_sorted", |b| {
        b.iter(|| build(black_box(&sorted)));
    });

    group.bench_function("insert_shuffled", |b| {
        b.iter(|| build(black_box(&shuffled)));
    });

    let degenerate = build(&sorted);
    let balanced = build(&shuffled);

    group.bench_function("lookup_sorted", |b| {
        b.iter(|| shuffled.iter().filter(|k| degenerate.get(*k).is_some()).count());
    });

    group.bench_function("lookup_shuffled", |b| {
        b.iter(|| shuffled.iter().filter(|k| balanced.get(*k).is_some()).count());
    });

    group.bench_function("remove_shuffled", |b| {
        b.iter_batched(
            || build(&shuffled),
            |mut map| {
                for key in &shuffled {
                    black_box(map.remove(key));
                }
                map
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn catalog_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Catalog Operations");

    group.bench_function("loan_return_cycle", |b| {
        b.iter_batched(
            || {
                let mut catalog = Catalog::new();
                for id in 0..100 {
                    catalog.register_book(Identifier::Number(id), "Title", "Author", "Genre", "2000").ok();
                    catalog.register_patron(Identifier::Number(id), "Patron", "").ok();
                }
                catalog
            },
            |mut catalog| {
                for id in 0..100 {
                    black_box(catalog.loan(&Identifier::Number(id), &Identifier::Number(id)).ok());
                }
                for id in 0..100 {
                    black_box(catalog.return_book(&Identifier::Number(id)).ok());
                }
                catalog
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = ordered_map_bench, catalog_bench
}
criterion_main!(benches);
