//! Basic example of using the SA-PDPTW library on a synthetic instance.

use clap::Parser;
use sa_pdptw::config::Config;
use sa_pdptw::problem::{Cargo, DistanceMatrix, Problem, Task, TimeWindow, Vehicle};
use sa_pdptw::utils::{format_duration, save_solution, SearchStatistics};
use sa_pdptw::SaAlgorithm;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Solve a synthetic PDPTW instance with simulated annealing")]
struct Args {
    /// Number of tasks in the generated instance
    #[arg(long, default_value_t = 30)]
    tasks: usize,

    /// Number of vehicles in the fleet
    #[arg(long, default_value_t = 4)]
    vehicles: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Time limit in seconds
    #[arg(long, default_value_t = 10)]
    time_limit: u64,

    /// Initial annealing temperature
    #[arg(long, default_value_t = 1000.0)]
    initial_temperature: f64,

    /// Cooling rate per iteration
    #[arg(long, default_value_t = 0.98)]
    cooling_rate: f64,

    /// Offer every task to some vehicle
    #[arg(long)]
    must_schedule_all: bool,

    /// Write the best solution to this file
    #[arg(long)]
    output: Option<String>,

    /// Print the best solution as JSON
    #[arg(long)]
    json: bool,
}

/// Build a synthetic instance: locations on a line connected pairwise,
/// tasks with staggered overlapping windows.
fn build_problem(task_count: usize, vehicle_count: usize) -> Result<Problem, sa_pdptw::SolverError> {
    let locations = task_count.max(2) + 1;
    let edges: Vec<(usize, usize, f64)> = (0..locations - 1)
        .map(|i| (i, i + 1, 5.0 + (i % 3) as f64))
        .collect();
    let distances = DistanceMatrix::from_network(locations, &edges)?;

    let tasks: Vec<Task> = (0..task_count)
        .map(|i| {
            let offset = (i % 10) as f64 * 6.0;
            Task::new(
                i,
                i % locations,
                (i * 3 + 1) % locations,
                Cargo::new(i % 3, 4.0 + (i % 5) as f64),
                TimeWindow::bounded(offset, offset + 12.0, offset + 15.0, offset + 40.0),
            )
        })
        .collect();

    let fleet: Vec<Vehicle> = (0..vehicle_count)
        .map(|v| Vehicle::new(v, (v * 7) % locations, 10.0))
        .collect();

    let prices: Vec<Vec<f64>> = (0..task_count)
        .map(|i| {
            (0..vehicle_count)
                .map(|v| 120.0 + ((i * 13 + v * 7) % 40) as f64)
                .collect()
        })
        .collect();

    Problem::new(tasks, fleet, prices, distances, 0.0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    println!(
        "Building instance with {} tasks and {} vehicles",
        args.tasks, args.vehicles
    );
    let problem = build_problem(args.tasks, args.vehicles)?;

    let config = Config::new()
        .with_initial_temperature(args.initial_temperature)
        .with_cooling_rate(args.cooling_rate)
        .with_time_limit(Duration::from_secs(args.time_limit))
        .with_must_schedule_all(args.must_schedule_all)
        .with_seed(args.seed);

    println!("Starting annealing (time limit: {}s)", args.time_limit);
    let mut algorithm = SaAlgorithm::new(problem.clone(), config);
    let best = algorithm.run()?.clone();

    let statistics = SearchStatistics {
        iterations: algorithm.iterations,
        runtime: algorithm.run_time,
        best_fitness: best.fitness,
        best_revenue: best.revenue,
        best_cost: best.cost,
        scheduled_tasks: best.scheduled_tasks().len(),
        unscheduled_tasks: best.unscheduled_tasks().len(),
        final_temperature: algorithm.temperature,
    };

    println!("Search completed in {}", format_duration(algorithm.run_time));
    println!("{}", statistics.format());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&best)?);
    }

    if let Some(path) = args.output {
        println!("Saving solution to: {}", path);
        save_solution(&best, &problem, &path)?;
    }

    Ok(())
}
