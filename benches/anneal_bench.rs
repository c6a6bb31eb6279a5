//! Criterion benchmarks for the annealing engine.
//!
//! Measures full runs on the sequencing and flow shop problems so the
//! engine overhead and a makespan-heavy cost function are both covered.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_anneal::sa::{MultiStart, SaConfig, SaRunner};
use u_anneal::scheduling::{AdjacentSquaredGap, FlowShop};

fn random_values(n: usize) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..n).map(|_| rng.random_range(-1000..1000)).collect()
}

fn random_flow_shop(jobs: usize, machines: usize) -> FlowShop {
    let mut rng = StdRng::seed_from_u64(1);
    let rows: Vec<Vec<u64>> = (0..jobs)
        .map(|_| (0..machines).map(|_| rng.random_range(1..100)).collect())
        .collect();
    FlowShop::new(&rows).unwrap()
}

fn bench_sa_sequencing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sa_sequencing");
    group.sample_size(10);

    for &n in &[10, 50, 100] {
        let problem = AdjacentSquaredGap::new(random_values(n)).unwrap();
        let config = SaConfig::default()
            .with_initial_temperature(100.0)
            .with_min_temperature(0.01)
            .with_max_iterations(5000)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(problem, config), |b, (p, c)| {
            b.iter(|| {
                let result = SaRunner::run(black_box(p), black_box(c));
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_sa_flow_shop(c: &mut Criterion) {
    let mut group = c.benchmark_group("sa_flow_shop");
    group.sample_size(10);

    for &(jobs, machines) in &[(10, 5), (20, 10), (50, 20)] {
        let problem = random_flow_shop(jobs, machines);
        let config = SaConfig::default()
            .with_max_iterations(2000)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{jobs}x{machines}")),
            &(problem, config),
            |b, (p, c)| {
                b.iter(|| {
                    let result = SaRunner::run(black_box(p), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_multistart_flow_shop(c: &mut Criterion) {
    let mut group = c.benchmark_group("multistart_flow_shop");
    group.sample_size(10);

    let problem = FlowShop::demo();
    let config = SaConfig::default().with_max_iterations(2000).with_seed(42);
    for &runs in &[1, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(runs), &runs, |b, &runs| {
            b.iter(|| {
                let result = MultiStart::new(runs).run(black_box(&problem), black_box(&config));
                black_box(result)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sa_sequencing,
    bench_sa_flow_shop,
    bench_multistart_flow_shop
);
criterion_main!(benches);
