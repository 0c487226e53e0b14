//! Mutation operators producing neighboring candidates.

use crate::config::Config;
use crate::genome::{sample_service_times, Genome};
use crate::problem::Problem;
use rand::Rng;

/// The available neighborhood moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Exchange the positions of two genes in the genome.
    SwapGenes,
    /// Shift one cutoff by one and restore monotonicity.
    AdjustCutoff,
    /// Resample one gene's pickup/dropoff pair.
    PerturbTimes,
}

impl MutationKind {
    const ALL: [MutationKind; 3] = [
        MutationKind::SwapGenes,
        MutationKind::AdjustCutoff,
        MutationKind::PerturbTimes,
    ];
}

/// Implements the mutation step of the annealing search.
pub struct Mutation;

impl Mutation {
    /// Produce a mutated copy of the parent genome and cutoffs.
    ///
    /// Exactly one operator is chosen uniformly at random and applied to a
    /// copy; the parent is never modified.
    pub fn mutate<R: Rng>(
        genome: &Genome,
        cutoffs: &[usize],
        problem: &Problem,
        config: &Config,
        rng: &mut R,
    ) -> (Genome, Vec<usize>) {
        let mut genome = genome.clone();
        let mut cutoffs = cutoffs.to_vec();

        match MutationKind::ALL[rng.gen_range(0..MutationKind::ALL.len())] {
            MutationKind::SwapGenes => Self::swap_genes(&mut genome, rng),
            MutationKind::AdjustCutoff => Self::adjust_cutoff(
                &mut cutoffs,
                problem.task_count(),
                config.must_schedule_all,
                rng,
            ),
            MutationKind::PerturbTimes => Self::perturb_times(&mut genome, problem, rng),
        }

        (genome, cutoffs)
    }

    /// Exchange two distinct gene positions.
    ///
    /// A no-op when the genome holds fewer than two genes.
    pub fn swap_genes<R: Rng>(genome: &mut Genome, rng: &mut R) {
        if genome.len() < 2 {
            return;
        }

        let first = rng.gen_range(0..genome.len());
        let mut second = rng.gen_range(0..genome.len());
        while second == first {
            second = rng.gen_range(0..genome.len());
        }

        genome.genes.swap(first, second);
    }

    /// Shift one cutoff by plus or minus one, clamped to `[0, task_count]`,
    /// and re-sort the vector.
    ///
    /// Under the must-schedule-all flag the last cutoff is forced back to
    /// `task_count` afterwards.
    pub fn adjust_cutoff<R: Rng>(
        cutoffs: &mut Vec<usize>,
        task_count: usize,
        must_schedule_all: bool,
        rng: &mut R,
    ) {
        if cutoffs.is_empty() {
            return;
        }

        let index = rng.gen_range(0..cutoffs.len());
        if rng.gen_bool(0.5) {
            cutoffs[index] = (cutoffs[index] + 1).min(task_count);
        } else {
            cutoffs[index] = cutoffs[index].saturating_sub(1);
        }
        cutoffs.sort_unstable();

        if must_schedule_all {
            if let Some(last) = cutoffs.last_mut() {
                *last = task_count;
            }
        }
    }

    /// Resample one gene's service times with the encoder's sampling rule.
    pub fn perturb_times<R: Rng>(genome: &mut Genome, problem: &Problem, rng: &mut R) {
        if genome.is_empty() {
            return;
        }

        let index = rng.gen_range(0..genome.len());
        let gene = &mut genome.genes[index];
        let window = &problem.tasks[gene.task].window;

        let (pickup_time, dropoff_time) = sample_service_times(window, rng);
        gene.pickup_time = pickup_time;
        gene.dropoff_time = dropoff_time;
    }
}
