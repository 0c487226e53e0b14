//! Configuration parameters for the annealing search.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration settings for the simulated-annealing solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Temperature at the start of the cooling loop.
    pub initial_temperature: f64,
    /// Temperature below which the cooling loop stops.
    pub final_temperature: f64,
    /// Factor applied to the temperature every iteration, below one.
    pub cooling_rate: f64,
    /// Optional wall-clock budget, checked once per iteration.
    pub time_limit: Option<Duration>,
    /// Force the last cutoff to cover the whole genome, so every task is
    /// offered to some vehicle.
    pub must_schedule_all: bool,
    /// Seed for the random generator; a fresh entropy seed when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            initial_temperature: 1000.0,
            final_temperature: 0.1,
            cooling_rate: 0.98,
            time_limit: None,
            must_schedule_all: false,
            seed: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the initial temperature.
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    /// Set the final temperature.
    pub fn with_final_temperature(mut self, temperature: f64) -> Self {
        self.final_temperature = temperature;
        self
    }

    /// Set the cooling rate.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Set whether the last cutoff must cover the whole genome.
    pub fn with_must_schedule_all(mut self, must_schedule_all: bool) -> Self {
        self.must_schedule_all = must_schedule_all;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
