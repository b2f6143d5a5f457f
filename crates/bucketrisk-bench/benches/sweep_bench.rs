//! Overflow model microbenchmarks.
//!
//! Measures:
//! - `arrival_probability(...)` at shallow, peak and deep depths
//! - `expected_load(...)` across hop budgets (cost is linear in ΔExp)
//! - a full `run_sweep(...)` for each preset
//! - `compare_hop_budgets(...)` over the usual 10/100/1000 overlay

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use bucketrisk_model::{
    ModelParams, Preset, arrival_probability, compare_hop_budgets, expected_load, run_sweep,
};

fn bench_arrival(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrival_probability");
    group.throughput(Throughput::Elements(1));
    for &depth in &[0u32, 10, 25, 30, 60] {
        group.bench_with_input(BenchmarkId::new("y=1e6", depth), &depth, |b, &d| {
            b.iter(|| black_box(arrival_probability(black_box(d), black_box(500), 1_000_000)));
        });
    }
    group.finish();
}

fn bench_expected_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("expected_load");
    for &budget in &[10u32, 100, 1000] {
        group.throughput(Throughput::Elements(u64::from(budget)));
        group.bench_with_input(BenchmarkId::new("depth=25", budget), &budget, |b, &k| {
            b.iter(|| black_box(expected_load(black_box(k), 25, 1_000_000, 1_000_000)));
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_sweep");
    for preset in [Preset::Analysis, Preset::Deployment] {
        let params = preset.params();
        let evaluations = u64::from(params.max_depth + 1) * u64::from(params.hop_budget);
        group.throughput(Throughput::Elements(evaluations));
        group.bench_with_input(
            BenchmarkId::new("preset", preset.as_str()),
            &params,
            |b, p: &ModelParams| {
                b.iter(|| {
                    let sweep = run_sweep(black_box(p)).ok();
                    black_box(sweep.map(|s| s.peak()))
                });
            },
        );
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let params = Preset::Analysis.params();
    let budgets = [10u32, 100, 1000];
    c.bench_function("compare_hop_budgets/analysis", |b| {
        b.iter(|| black_box(compare_hop_budgets(black_box(&params), &budgets).ok()));
    });
}

criterion_group!(
    benches,
    bench_arrival,
    bench_expected_load,
    bench_sweep,
    bench_compare
);
criterion_main!(benches);
