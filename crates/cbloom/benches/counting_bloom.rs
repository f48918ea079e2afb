//! # Counting Bloom Filter Benchmarks
//!
//! - Add / count / remove: one salted digest per block of indices, O(k) counters
//! - Generator construction: one salt digest per block
//! - Digest escalation: wider layouts pay for larger digests

use cbloom::{CountingBloomFilter, HashSequenceGenerator};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_keys(n: usize) -> Vec<[u8; 32]> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.gen()).collect()
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting_bloom/add");
    let keys = random_keys(1_000);
    group.throughput(Throughput::Elements(keys.len() as u64));

    for error_rate in [0.01, 0.001, 0.000_001] {
        group.bench_with_input(
            BenchmarkId::from_parameter(error_rate),
            &error_rate,
            |b, &error_rate| {
                b.iter(|| {
                    let mut filter = CountingBloomFilter::new(10_000, error_rate).unwrap();
                    for key in &keys {
                        black_box(filter.add(key).unwrap());
                    }
                })
            },
        );
    }
    group.finish();
}

fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting_bloom/count");
    let keys = random_keys(1_000);
    let mut filter = CountingBloomFilter::new(10_000, 0.001).unwrap();
    for key in &keys {
        filter.add(key).unwrap();
    }
    let misses = random_keys(2_000).split_off(1_000);

    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("hit", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(filter.count(key));
            }
        })
    });
    group.bench_function("miss", |b| {
        b.iter(|| {
            for key in &misses {
                black_box(filter.contains(key));
            }
        })
    });
    group.finish();
}

fn bench_add_remove_cycle(c: &mut Criterion) {
    let keys = random_keys(1_000);
    let mut filter = CountingBloomFilter::new(10_000, 0.001).unwrap();

    c.bench_function("counting_bloom/add_remove_cycle", |b| {
        b.iter(|| {
            for key in &keys {
                filter.add(key).unwrap();
            }
            for key in &keys {
                black_box(filter.remove(key));
            }
        })
    });
}

fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_sequence");
    for (num_slices, counters_per_slice) in [(7, 137), (10, 14_378), (20, 40_000), (40, 1 << 31)] {
        let generator = HashSequenceGenerator::new(num_slices, counters_per_slice);
        group.bench_with_input(
            BenchmarkId::new(generator.digest_kind().name(), num_slices),
            &generator,
            |b, generator| b.iter(|| generator.indices(black_box(b"benchmark-key")).sum::<usize>()),
        );
    }
    group.bench_function("build", |b| {
        b.iter(|| HashSequenceGenerator::new(black_box(40), black_box(1 << 31)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_add,
    bench_count,
    bench_add_remove_cycle,
    bench_generator
);
criterion_main!(benches);
