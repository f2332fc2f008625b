//! Throughput of the scoring pipeline and its hot metric kernels.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dealscope::application::services::{ScoringEngine, ScoringRequest};
use dealscope::domain::entities::{BusinessEntity, BusinessEntityBuilder};
use dealscope::domain::services::metric_computer::complexity_estimate;
use dealscope::domain::value_objects::Timestamp;
use dealscope::infrastructure::providers::SeededSignalProvider;
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;

fn entities(n: usize) -> Vec<BusinessEntity> {
    (0..n)
        .map(|i| {
            BusinessEntityBuilder::new(
                format!("bench-{i}"),
                if i % 2 == 0 { "HVAC" } else { "Security" },
                Decimal::new(750_000 + 10_000 * i as i64, 0),
            )
            .owner_age(45 + (i % 30) as u32)
            .build()
        })
        .collect()
}

fn bench_score_batch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let engine = ScoringEngine::with_defaults(Arc::new(SeededSignalProvider::new(1))).unwrap();
    let as_of = Timestamp::from_secs(1_700_000_000).unwrap();

    let mut group = c.benchmark_group("score_batch");
    for size in [10usize, 100, 1_000] {
        let request = ScoringRequest::new(entities(size)).as_of(as_of);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, request| {
            b.to_async(&runtime)
                .iter(|| async { black_box(engine.score_batch(request.clone()).await.unwrap()) });
        });
    }
    group.finish();
}

fn bench_complexity(c: &mut Criterion) {
    let as_of = Timestamp::from_secs(1_700_000_000).unwrap();
    let mut group = c.benchmark_group("complexity_estimate");
    for len in [64usize, 256, 512] {
        let series: Vec<f64> = (0..len).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &series, |b, series| {
            b.iter(|| complexity_estimate(black_box(series), 3, as_of));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score_batch, bench_complexity);
criterion_main!(benches);
