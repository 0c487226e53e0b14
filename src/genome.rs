//! Genome encoding for the annealing search.

use crate::config::Config;
use crate::problem::{Problem, TimeWindow};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Attempts at drawing a pickup/dropoff pair before falling back to the
/// window edges.
const MAX_RESAMPLE_ATTEMPTS: usize = 64;

/// One task's entry within a genome.
///
/// Genes reference their task by index into [`Problem::tasks`]; prices stay
/// in the problem's price matrix, so a gene is plain `Copy` data and cloning
/// a genome never duplicates task or price payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Index of the task in [`Problem::tasks`].
    pub task: usize,
    /// Sampled pickup service time, within the task's pickup window.
    pub pickup_time: f64,
    /// Sampled dropoff service time, within the task's dropoff window and
    /// strictly after the pickup.
    pub dropoff_time: f64,
    /// Vehicle this gene was committed to by the last decode, if any.
    pub committed_vehicle: Option<usize>,
}

/// Candidate ordering and per-task scheduling parameters for one run.
///
/// Gene order determines insertion precedence during decoding, not the
/// final service order of any vehicle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Genome {
    pub genes: Vec<Gene>,
}

impl Genome {
    /// Build an initial random genome and cutoff vector for the problem.
    ///
    /// Every task gets one gene with rejection-sampled service times; gene
    /// order is shuffled. The cutoff vector holds one sorted uniform draw
    /// from `[0, task_count)` per vehicle, with the last cutoff forced to
    /// `task_count` under the must-schedule-all flag.
    pub fn encode<R: Rng>(
        problem: &Problem,
        config: &Config,
        rng: &mut R,
    ) -> (Genome, Vec<usize>) {
        let task_count = problem.task_count();

        let mut genes: Vec<Gene> = problem
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let (pickup_time, dropoff_time) = sample_service_times(&task.window, rng);
                Gene {
                    task: index,
                    pickup_time,
                    dropoff_time,
                    committed_vehicle: None,
                }
            })
            .collect();

        let mut cutoffs: Vec<usize> = if task_count == 0 {
            vec![0; problem.vehicle_count()]
        } else {
            (0..problem.vehicle_count())
                .map(|_| rng.gen_range(0..task_count))
                .collect()
        };
        cutoffs.sort_unstable();

        if config.must_schedule_all {
            if let Some(last) = cutoffs.last_mut() {
                *last = task_count;
            }
        }

        genes.shuffle(rng);

        (Genome { genes }, cutoffs)
    }

    /// Number of genes in the genome.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Check if the genome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Number of genes committed to a vehicle by the last decode.
    pub fn committed_count(&self) -> usize {
        self.genes
            .iter()
            .filter(|gene| gene.committed_vehicle.is_some())
            .count()
    }
}

/// Draw a pickup/dropoff service time pair for the given window.
///
/// The pickup is uniform in `[earliest_pickup, latest_pickup)` and the
/// dropoff uniform in `[earliest_dropoff, latest_dropoff)`, resampled while
/// the pickup does not strictly precede the dropoff. The loop is bounded;
/// on exhaustion the window edges are returned and decoding rejects the
/// gene if they are out of bounds.
pub fn sample_service_times<R: Rng>(window: &TimeWindow, rng: &mut R) -> (f64, f64) {
    let (earliest_pickup, latest_pickup) = window.pickup_bounds();
    let (earliest_dropoff, latest_dropoff) = window.dropoff_bounds();

    for _ in 0..MAX_RESAMPLE_ATTEMPTS {
        let pickup = sample_uniform(earliest_pickup, latest_pickup, rng);
        let dropoff = sample_uniform(earliest_dropoff, latest_dropoff, rng);

        if pickup < dropoff {
            return (pickup, dropoff);
        }
    }

    // The windows barely overlap, if at all. Fall back to the extreme
    // edges; an ordered pair may still not exist within the windows.
    if earliest_pickup < latest_dropoff {
        (earliest_pickup, latest_dropoff)
    } else {
        (earliest_pickup, earliest_pickup + 1.0)
    }
}

/// Draw uniformly from `[low, high)`, or `low` when the interval is empty.
fn sample_uniform<R: Rng>(low: f64, high: f64, rng: &mut R) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}
