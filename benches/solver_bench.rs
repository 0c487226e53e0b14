//! Benchmarks for the annealing solver.

#[cfg(feature = "bench")]
extern crate criterion;

#[cfg(feature = "bench")]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
#[cfg(feature = "bench")]
use rand::SeedableRng;
#[cfg(feature = "bench")]
use rand_chacha::ChaCha8Rng;
use sa_pdptw::config::Config;
use sa_pdptw::decoder::Decoder;
use sa_pdptw::genome::Genome;
use sa_pdptw::problem::{Cargo, DistanceMatrix, Problem, Task, TimeWindow, Vehicle};
use sa_pdptw::SaAlgorithm;
use std::time::Duration;

/// Create a benchmark problem of specified size.
fn create_benchmark_problem(size: usize) -> Problem {
    let locations = size + 1;
    let distances = DistanceMatrix::new(
        (0..locations)
            .map(|i| {
                (0..locations)
                    .map(|j| (i as f64 - j as f64).abs() * 5.0)
                    .collect()
            })
            .collect(),
    );

    // Tasks with staggered, overlapping windows along the line.
    let tasks: Vec<Task> = (0..size)
        .map(|i| {
            let offset = i as f64 * 3.0;
            Task::new(
                i,
                i % locations,
                (i + 1) % locations,
                Cargo::new(i % 3, 5.0 + (i % 4) as f64),
                TimeWindow::bounded(offset, offset + 10.0, offset + 12.0, offset + 30.0),
            )
        })
        .collect();

    let vehicle_count = (size / 5).max(1);
    let fleet: Vec<Vehicle> = (0..vehicle_count)
        .map(|v| Vehicle::new(v, v % locations, 10.0))
        .collect();

    let prices: Vec<Vec<f64>> = (0..size)
        .map(|i| (0..vehicle_count).map(|v| 100.0 + (i + v) as f64).collect())
        .collect();

    Problem::new(tasks, fleet, prices, distances, 0.0).unwrap()
}

#[cfg(feature = "bench")]
fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let config = Config::new();
            let mut rng = ChaCha8Rng::seed_from_u64(42);

            b.iter(|| Genome::encode(&problem, &config, &mut rng));
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let config = Config::new();
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let (genome, cutoffs) = Genome::encode(&problem, &config, &mut rng);

            b.iter(|| {
                let mut candidate = genome.clone();
                Decoder::decode(&mut candidate, &cutoffs, &problem)
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.measurement_time(Duration::from_secs(30));

    for size in [50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let config = Config::new()
                .with_initial_temperature(100.0)
                .with_final_temperature(1.0)
                .with_cooling_rate(0.95)
                .with_time_limit(Duration::from_secs(5))
                .with_seed(42);

            b.iter(|| {
                let mut algorithm = SaAlgorithm::new(problem.clone(), config.clone());
                algorithm.run().map(|solution| solution.fitness)
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
criterion_group!(benches, benchmark_encode, benchmark_decode, benchmark_run);

#[cfg(feature = "bench")]
criterion_main!(benches);
