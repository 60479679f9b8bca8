//! Deduplication Throughput Benchmark
//!
//! Measures single-pass dedup over hearing batches with a controlled
//! duplicate ratio, and the cross-snapshot merge of a refetch.
//!
//! **Goal:** A full 2020-2026 hearings snapshot (~20k records) cleans in well
//! under a second

use congress_ingest::models::{Hearing, Person, SourceLink};
use congress_ingest::services::{dedupe, merge_snapshots};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn hearing(i: usize, rich: bool) -> Hearing {
    Hearing {
        title: Some(format!("Hearing {}", i)),
        date: Some(format!("2022-{:02}-{:02}", i % 12 + 1, i % 28 + 1)),
        congress: Some(117),
        chamber: Some("Senate".to_string()),
        committee: Some(format!("Committee {}", i % 40)),
        witnesses: rich.then(|| vec![Person::named("A"), Person::named("B")]),
        sources: rich.then(|| vec![SourceLink::new("https://example.test", "text", "govinfo")]),
        ..Default::default()
    }
}

/// `n` records where every `every`-th one repeats an earlier key with more data
fn batch(n: usize, every: usize) -> Vec<Hearing> {
    (0..n)
        .map(|i| {
            if every > 0 && i % every == 0 && i > 0 {
                hearing(i - 1, true)
            } else {
                hearing(i, false)
            }
        })
        .collect()
}

fn bench_dedupe(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedupe");

    for size in [1_000usize, 10_000, 20_000] {
        let records = batch(size, 5);
        group.bench_with_input(BenchmarkId::new("hearings", size), &records, |b, records| {
            b.iter(|| {
                let outcome = dedupe(black_box(records.clone()));
                black_box(outcome.duplicates);
            });
        });
    }

    group.finish();
}

fn bench_cross_merge(c: &mut Criterion) {
    let primary = batch(10_000, 0);
    let refetch: Vec<Hearing> = (0..2_000).map(|i| hearing(i * 3, true)).collect();

    c.bench_function("merge_snapshots_10k_2k", |b| {
        b.iter(|| {
            let outcome = merge_snapshots(black_box(primary.clone()), black_box(refetch.clone()));
            black_box(outcome.updated_from_secondary);
        });
    });
}

criterion_group!(benches, bench_dedupe, bench_cross_merge);
criterion_main!(benches);
