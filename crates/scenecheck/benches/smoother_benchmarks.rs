//! Smoothing and full-pipeline benchmarks.
//!
//! Measures the smoother on long noisy sequences and the engine across
//! scene counts and worker counts.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scenecheck::{DataTable, Engine, EngineConfig, FieldSpec, TemporalSmoother, Thresholds};

/// A binary sequence with a short spike every `period` frames.
fn noisy_sequence(len: usize, period: usize) -> Vec<&'static str> {
    (0..len)
        .map(|i| if i % period == period / 2 { "Yes" } else { "No" })
        .collect()
}

/// A table of `scenes` scenes with `frames` frames each.
fn synthetic_table(scenes: usize, frames: usize) -> DataTable {
    let headers = ["Scene", "Frame", "divided", "undivided", "night"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = Vec::with_capacity(scenes * frames);
    for scene in 0..scenes {
        for frame in 0..frames {
            let spike = (frame + scene) % 17 == 8;
            rows.push(vec![
                format!("scene_{scene:04}"),
                frame.to_string(),
                if spike { "yes" } else { "No" }.to_string(),
                if spike { "No" } else { "Yes" }.to_string(),
                if frame % 40 < 20 { "No" } else { "Yes" }.to_string(),
            ]);
        }
    }
    DataTable::new(headers, rows, b',')
}

fn config(workers: usize) -> EngineConfig {
    let mut config = EngineConfig::default()
        .with_thresholds(3, 5)
        .with_field("Divided", FieldSpec::binary("divided"))
        .with_field("Undivided", FieldSpec::binary("undivided"))
        .with_field("Night", FieldSpec::binary("night"));
    config.order_col = Some("Frame".to_string());
    config.smoothing.fields = vec![
        "Divided".to_string(),
        "Undivided".to_string(),
        "Night".to_string(),
    ];
    config.workers = workers;
    config
}

fn bench_smoother(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoother");
    let smoother = TemporalSmoother::new(Thresholds::new(3, 5));

    for len in [100, 1_000, 10_000] {
        let values = noisy_sequence(len, 10);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("frames", len), &values, |b, values| {
            b.iter(|| smoother.smooth(black_box(values)))
        });
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(20);

    let table = synthetic_table(200, 150);
    group.throughput(Throughput::Elements(table.row_count() as u64));
    for workers in [1, 4] {
        let engine = Engine::new(config(workers)).expect("valid config");
        group.bench_with_input(BenchmarkId::new("workers", workers), &table, |b, table| {
            b.iter(|| engine.run(black_box(table)).expect("run"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_smoother, bench_engine);
criterion_main!(benches);
