//! Integration tests for the full annealing algorithm.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sa_pdptw::config::Config;
use sa_pdptw::decoder::Decoder;
use sa_pdptw::evaluation::Evaluator;
use sa_pdptw::genome::Genome;
use sa_pdptw::problem::{Cargo, DistanceMatrix, Problem, Task, TimeWindow, Vehicle};
use sa_pdptw::schedule::StopKind;
use sa_pdptw::{SaAlgorithm, SolverError};
use std::time::Duration;

/// Creates a test problem with six tasks over five locations and two
/// vehicles.
fn create_test_problem() -> Problem {
    let distances = DistanceMatrix::new(
        (0..5)
            .map(|i| (0..5).map(|j| (i as f64 - j as f64).abs() * 10.0).collect())
            .collect(),
    );

    let tasks = vec![
        Task::new(0, 0, 1, Cargo::new(0, 10.0), TimeWindow::bounded(1.0, 2.0, 9.0, 10.0)),
        Task::new(1, 1, 2, Cargo::new(0, 5.0), TimeWindow::bounded(3.0, 4.0, 6.0, 7.0)),
        Task::new(2, 2, 3, Cargo::new(1, 8.0), TimeWindow::bounded(2.0, 5.0, 10.0, 13.0)),
        Task::new(3, 0, 3, Cargo::new(0, 12.0), TimeWindow::bounded(1.0, 8.0, 9.0, 16.0)),
        Task::new(4, 3, 4, Cargo::new(0, 6.0), TimeWindow::bounded(6.0, 7.0, 20.0, 21.0)),
        Task::new(5, 1, 4, Cargo::new(1, 9.0), TimeWindow::bounded(5.0, 10.0, 15.0, 20.0)),
    ];

    let fleet = vec![Vehicle::new(0, 0, 10.0), Vehicle::new(1, 2, 10.0)];
    let prices = vec![
        vec![150.0, 140.0],
        vec![120.0, 125.0],
        vec![160.0, 150.0],
        vec![135.0, 140.0],
        vec![110.0, 115.0],
        vec![145.0, 150.0],
    ];

    Problem::new(tasks, fleet, prices, distances, 0.0).unwrap()
}

fn fast_config(seed: u64) -> Config {
    Config::new()
        .with_initial_temperature(100.0)
        .with_final_temperature(0.1)
        .with_cooling_rate(0.95)
        .with_seed(seed)
}

#[test]
fn test_run_returns_solution() {
    let problem = create_test_problem();
    let mut algorithm = SaAlgorithm::new(problem.clone(), fast_config(42));

    let best = algorithm.run().unwrap().clone();

    assert_eq!(best.genome.len(), problem.task_count());
    assert_eq!(best.cutoffs.len(), problem.vehicle_count());
    assert_eq!(best.schedules.len(), problem.vehicle_count());
    assert!(best.fitness.is_finite());
    assert!(algorithm.iterations > 0);
}

#[test]
fn test_best_is_at_least_initial() {
    let problem = create_test_problem();
    let config = fast_config(7);

    // Replay the INIT phase with the same seed to recover the initial
    // solution's fitness.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let (mut initial_genome, initial_cutoffs) = Genome::encode(&problem, &config, &mut rng);
    let schedules = Decoder::decode(&mut initial_genome, &initial_cutoffs, &problem);
    let initial = Evaluator::evaluate(&initial_genome, &schedules, &problem);

    let mut algorithm = SaAlgorithm::new(problem, config);
    let best = algorithm.run().unwrap();

    assert!(best.fitness >= initial.fitness - 1e-9);
}

#[test]
fn test_best_schedules_are_feasible() {
    let problem = create_test_problem();
    let mut algorithm = SaAlgorithm::new(problem.clone(), fast_config(13));

    let best = algorithm.run().unwrap();

    for schedule in &best.schedules {
        assert!(schedule.is_feasible(problem.current_time));
    }

    // Every committed gene's pickup precedes its dropoff in the stop list.
    for gene in &best.genome.genes {
        let Some(vehicle) = gene.committed_vehicle else {
            continue;
        };
        let task_id = problem.tasks[gene.task].id;
        let stops = &best.schedules[vehicle].stops;

        let pickup = stops
            .iter()
            .position(|stop| stop.task == task_id && stop.kind == StopKind::Pickup);
        let dropoff = stops
            .iter()
            .position(|stop| stop.task == task_id && stop.kind == StopKind::Dropoff);

        assert!(pickup.unwrap() < dropoff.unwrap());
    }
}

#[test]
fn test_same_seed_reproduces_run() {
    let problem = create_test_problem();

    let mut first = SaAlgorithm::new(problem.clone(), fast_config(99));
    let mut second = SaAlgorithm::new(problem, fast_config(99));

    let first_best = first.run().unwrap().clone();
    let second_best = second.run().unwrap().clone();

    assert_eq!(first_best.fitness, second_best.fitness);
    assert_eq!(first_best.cutoffs, second_best.cutoffs);
    assert_eq!(first_best.genome, second_best.genome);
}

#[test]
fn test_zero_tasks_returns_empty_solution() {
    let distances = DistanceMatrix::new(vec![vec![0.0]]);
    let fleet = vec![
        Vehicle::new(0, 0, 10.0),
        Vehicle::new(1, 0, 10.0),
        Vehicle::new(2, 0, 10.0),
    ];
    let problem = Problem::new(Vec::new(), fleet, Vec::new(), distances, 0.0).unwrap();

    let mut algorithm = SaAlgorithm::new(problem, fast_config(1));
    let best = algorithm.run().unwrap();

    assert!(best.genome.is_empty());
    assert_eq!(best.cutoffs, vec![0, 0, 0]);
    assert_eq!(best.schedules.len(), 3);
}

#[test]
fn test_zero_vehicles_returns_empty_solution() {
    let distances = DistanceMatrix::new(vec![vec![0.0, 10.0], vec![10.0, 0.0]]);
    let tasks = vec![Task::new(
        0,
        0,
        1,
        Cargo::new(0, 10.0),
        TimeWindow::bounded(1.0, 2.0, 9.0, 10.0),
    )];
    let problem = Problem::new(tasks, Vec::new(), vec![Vec::new()], distances, 0.0).unwrap();

    let mut algorithm = SaAlgorithm::new(problem, fast_config(1));
    let best = algorithm.run().unwrap();

    assert!(best.cutoffs.is_empty());
    assert!(best.schedules.is_empty());
    assert_eq!(best.genome.committed_count(), 0);
}

#[test]
fn test_must_schedule_all_holds_in_result() {
    let problem = create_test_problem();
    let config = fast_config(21).with_must_schedule_all(true);

    let mut algorithm = SaAlgorithm::new(problem.clone(), config);
    let best = algorithm.run().unwrap();

    assert_eq!(*best.cutoffs.last().unwrap(), problem.task_count());
}

#[test]
fn test_best_solution_before_run_is_contract_error() {
    let problem = create_test_problem();
    let algorithm = SaAlgorithm::new(problem, fast_config(1));

    assert_eq!(algorithm.best_solution().unwrap_err(), SolverError::NotRun);
}

#[test]
fn test_best_solution_available_after_run() {
    let problem = create_test_problem();
    let mut algorithm = SaAlgorithm::new(problem, fast_config(1));

    let fitness = algorithm.run().unwrap().fitness;

    let best = algorithm.best_solution().unwrap();
    assert_eq!(best.fitness, fitness);
}

#[test]
fn test_time_limit_interrupts_cooling() {
    let problem = create_test_problem();
    // A schedule that would cool for a very long time without the budget.
    let config = Config::new()
        .with_initial_temperature(1000.0)
        .with_final_temperature(1e-12)
        .with_cooling_rate(0.999999)
        .with_time_limit(Duration::from_millis(50))
        .with_seed(3);

    let mut algorithm = SaAlgorithm::new(problem, config);
    let best = algorithm.run().unwrap().clone();

    // The interrupted run still produced a complete solution.
    assert!(best.fitness.is_finite());
    assert!(algorithm.run_time < Duration::from_secs(30));
}

#[test]
fn test_accept_rule() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    // A strictly better candidate is always accepted.
    for _ in 0..100 {
        assert!(SaAlgorithm::accept(10.0, 10.5, 1.0, &mut rng));
    }

    // An equal candidate has acceptance probability exp(0) = 1.
    for _ in 0..100 {
        assert!(SaAlgorithm::accept(10.0, 10.0, 1.0, &mut rng));
    }

    // A much worse candidate at a cold temperature is all but never
    // accepted.
    for _ in 0..100 {
        assert!(!SaAlgorithm::accept(10.0, -990.0, 0.001, &mut rng));
    }
}

#[test]
fn test_worse_candidates_sometimes_accepted_when_hot() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);

    // With delta = -1 and temperature 1000 the acceptance probability is
    // exp(-0.001), so essentially every trial passes.
    let accepted = (0..1000)
        .filter(|_| SaAlgorithm::accept(10.0, 9.0, 1000.0, &mut rng))
        .count();

    assert!(accepted > 900);
}
