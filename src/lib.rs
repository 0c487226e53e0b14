//! # SA-PDPTW
//!
//! A simulated-annealing solver for the multi-vehicle pickup and delivery
//! problem with time windows (PDPTW).
//!
//! Candidate solutions are encoded as a genome (one gene per task, carrying
//! sampled pickup and dropoff times) plus a cutoff vector partitioning the
//! genome among the vehicles of a fleet. A deterministic decoder turns each
//! candidate into verified per-vehicle schedules, an evaluator scores it as
//! expected revenue minus estimated consumption cost, and the annealing
//! loop explores the neighborhood through swap, cutoff and service-time
//! mutations under a Metropolis acceptance rule.

pub mod config;
pub mod decoder;
pub mod evaluation;
pub mod genome;
pub mod mutation;
pub mod problem;
pub mod schedule;
pub mod utils;

use crate::config::Config;
use crate::decoder::Decoder;
use crate::evaluation::Evaluator;
use crate::genome::Genome;
use crate::mutation::Mutation;
use crate::problem::Problem;
use crate::schedule::VehicleSchedule;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors surfaced to the caller.
///
/// Ordinary search setbacks (an infeasible insertion, an unreachable
/// location pair) are recovered internally and never appear here; only
/// contract violations do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The price matrix row count does not match the task count.
    #[error("price matrix has {rows} rows for {tasks} tasks")]
    PriceRowCount { rows: usize, tasks: usize },
    /// A price matrix row does not match the fleet size.
    #[error("price row for task {task} has {entries} entries for {vehicles} vehicles")]
    PriceRowWidth {
        task: usize,
        entries: usize,
        vehicles: usize,
    },
    /// A task announced a window with earliest after latest.
    #[error("task {task} has an inverted {which} window")]
    InvertedWindow { task: usize, which: &'static str },
    /// The location network contains a negative cycle.
    #[error("distance network contains a negative cycle")]
    NegativeCycle,
    /// Results were requested before a run completed.
    #[error("no solution available, the solver has not been run")]
    NotRun,
}

/// The best solution found by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub genome: Genome,
    pub cutoffs: Vec<usize>,
    /// Decoded schedules, one per vehicle in fleet order.
    pub schedules: Vec<VehicleSchedule>,
    /// Expected revenue minus estimated cost; higher is better.
    pub fitness: f64,
    pub revenue: f64,
    pub cost: f64,
}

impl Solution {
    /// Task indices committed to a vehicle.
    pub fn scheduled_tasks(&self) -> Vec<usize> {
        self.genome
            .genes
            .iter()
            .filter(|gene| gene.committed_vehicle.is_some())
            .map(|gene| gene.task)
            .collect()
    }

    /// Task indices left unscheduled.
    pub fn unscheduled_tasks(&self) -> Vec<usize> {
        self.genome
            .genes
            .iter()
            .filter(|gene| gene.committed_vehicle.is_none())
            .map(|gene| gene.task)
            .collect()
    }
}

/// The main algorithm structure that orchestrates the annealing search.
pub struct SaAlgorithm {
    pub problem: Problem,
    pub config: Config,
    pub best_solution: Option<Solution>,
    pub temperature: f64,
    pub iterations: u32,
    pub run_time: Duration,
    rng: ChaCha8Rng,
    start_time: Instant,
}

impl SaAlgorithm {
    /// Create a new solver instance for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        SaAlgorithm {
            problem,
            temperature: config.initial_temperature,
            config,
            best_solution: None,
            iterations: 0,
            run_time: Duration::from_secs(0),
            rng,
            start_time: Instant::now(),
        }
    }

    /// Run the annealing search and return the best solution found.
    ///
    /// The loop cools geometrically from the initial temperature and stops
    /// at the temperature floor or once the time budget is spent, whichever
    /// comes first. An empty problem (no tasks or no vehicles)
    /// short-circuits to a valid empty solution.
    pub fn run(&mut self) -> Result<&Solution, SolverError> {
        self.start_time = Instant::now();
        self.temperature = self.config.initial_temperature;
        self.iterations = 0;

        info!(
            "starting annealing over {} tasks and {} vehicles",
            self.problem.task_count(),
            self.problem.vehicle_count()
        );

        let (mut current_genome, current_cutoffs) =
            Genome::encode(&self.problem, &self.config, &mut self.rng);
        let schedules = Decoder::decode(&mut current_genome, &current_cutoffs, &self.problem);
        let evaluation = Evaluator::evaluate(&current_genome, &schedules, &self.problem);

        debug!("initial fitness {:.2}", evaluation.fitness);

        let mut best = Solution {
            genome: current_genome.clone(),
            cutoffs: current_cutoffs.clone(),
            schedules,
            fitness: evaluation.fitness,
            revenue: evaluation.revenue,
            cost: evaluation.cost,
        };

        let mut current_cutoffs = current_cutoffs;
        let mut current_fitness = evaluation.fitness;

        if self.problem.task_count() == 0 || self.problem.vehicle_count() == 0 {
            self.run_time = self.start_time.elapsed();
            self.best_solution = Some(best);
            return self.best_solution.as_ref().ok_or(SolverError::NotRun);
        }

        while !self.should_terminate() {
            let (mut candidate_genome, candidate_cutoffs) = Mutation::mutate(
                &current_genome,
                &current_cutoffs,
                &self.problem,
                &self.config,
                &mut self.rng,
            );
            let candidate_schedules =
                Decoder::decode(&mut candidate_genome, &candidate_cutoffs, &self.problem);
            let candidate =
                Evaluator::evaluate(&candidate_genome, &candidate_schedules, &self.problem);

            if Self::accept(
                current_fitness,
                candidate.fitness,
                self.temperature,
                &mut self.rng,
            ) {
                if candidate.fitness > best.fitness {
                    debug!(
                        "iteration {}: new best fitness {:.2}",
                        self.iterations, candidate.fitness
                    );
                    best = Solution {
                        genome: candidate_genome.clone(),
                        cutoffs: candidate_cutoffs.clone(),
                        schedules: candidate_schedules,
                        fitness: candidate.fitness,
                        revenue: candidate.revenue,
                        cost: candidate.cost,
                    };
                }

                current_genome = candidate_genome;
                current_cutoffs = candidate_cutoffs;
                current_fitness = candidate.fitness;
            }

            self.temperature *= self.config.cooling_rate;
            self.iterations += 1;
        }

        self.run_time = self.start_time.elapsed();
        info!(
            "annealing finished after {} iterations, best fitness {:.2}",
            self.iterations, best.fitness
        );

        self.best_solution = Some(best);
        self.best_solution.as_ref().ok_or(SolverError::NotRun)
    }

    /// The best solution of the last completed run.
    ///
    /// Asking before any run completed is a contract violation.
    pub fn best_solution(&self) -> Result<&Solution, SolverError> {
        self.best_solution.as_ref().ok_or(SolverError::NotRun)
    }

    /// Metropolis acceptance test.
    ///
    /// A strictly better candidate is always accepted; a candidate no
    /// better than the current solution is accepted with probability
    /// `exp(delta / temperature)`.
    pub fn accept<R: Rng>(
        current_fitness: f64,
        candidate_fitness: f64,
        temperature: f64,
        rng: &mut R,
    ) -> bool {
        if candidate_fitness > current_fitness {
            return true;
        }

        let delta = candidate_fitness - current_fitness;
        rng.gen::<f64>() < (delta / temperature).exp()
    }

    /// Check if the termination criteria are met.
    fn should_terminate(&self) -> bool {
        if self.temperature <= self.config.final_temperature {
            return true;
        }

        if let Some(time_limit) = self.config.time_limit {
            if self.start_time.elapsed() >= time_limit {
                return true;
            }
        }

        false
    }
}
