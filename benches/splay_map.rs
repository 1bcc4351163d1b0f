use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use splay_memo::splay_tree::SplayMap;
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 100;
const HOT_KEYS: usize = 8;

fn random_pairs() -> Vec<(u32, u32)> {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    (0..NUM_OF_OPERATIONS)
        .map(|_| (rng.next_u32(), rng.next_u32()))
        .collect()
}

fn bench_btreemap_insert(c: &mut Criterion) {
    let pairs = random_pairs();
    c.bench_function("bench btreemap insert", move |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &(key, val) in &pairs {
                map.insert(key, val);
            }
        })
    });
}

fn bench_btreemap_get(c: &mut Criterion) {
    let pairs = random_pairs();
    let map: BTreeMap<u32, u32> = pairs.iter().cloned().collect();

    c.bench_function("bench btreemap get", move |b| {
        b.iter(|| {
            for (key, _) in &pairs {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_splay_map_insert(c: &mut Criterion) {
    let pairs = random_pairs();
    c.bench_function("bench splay map insert", move |b| {
        b.iter(|| {
            let mut map = SplayMap::new();
            for &(key, val) in &pairs {
                map.insert(key, val);
            }
        })
    });
}

fn bench_splay_map_find(c: &mut Criterion) {
    let pairs = random_pairs();
    let mut map: SplayMap<u32, u32> = pairs.iter().cloned().collect();

    c.bench_function("bench splay map find", move |b| {
        b.iter(|| {
            for (key, _) in &pairs {
                black_box(map.find(key));
            }
        })
    });
}

// Repeated lookups of a few keys, which is where splaying pays off.
fn bench_splay_map_find_hot(c: &mut Criterion) {
    let pairs = random_pairs();
    let mut map: SplayMap<u32, u32> = pairs.iter().cloned().collect();
    let hot_keys: Vec<u32> = pairs.iter().take(HOT_KEYS).map(|&(key, _)| key).collect();

    c.bench_function("bench splay map find hot", move |b| {
        b.iter(|| {
            for _ in 0..NUM_OF_OPERATIONS / HOT_KEYS {
                for key in &hot_keys {
                    black_box(map.find(key));
                }
            }
        })
    });
}

criterion_group!(
    benches,
    bench_btreemap_get,
    bench_btreemap_insert,
    bench_splay_map_find,
    bench_splay_map_find_hot,
    bench_splay_map_insert,
);
criterion_main!(benches);
