//! Criterion benchmark of one offline analytics run over synthetic data.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ma_config::AnalyticsConfig;
use ma_core::history::SyntheticDatasets;
use ma_core::AnalyticsEngine;

fn bench_pipeline(c: &mut Criterion) {
    let end = Utc
        .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let data = SyntheticDatasets::generate(42, end);
    let current = data.current_values();

    let mut config = AnalyticsConfig::default();
    config.backend.enabled = false;
    config.noise.seed = Some(42);
    let engine = AnalyticsEngine::new(config).with_history_provider(Arc::new(data));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");

    c.bench_function("run_analytics_offline", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(engine.run_analytics(black_box(&current), None).await) })
    });

    c.bench_function("synthetic_generate", |b| {
        b.iter(|| black_box(SyntheticDatasets::generate(black_box(7), end)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
