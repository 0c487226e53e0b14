//! Deterministic decoding of a genome into per-vehicle schedules.

use crate::genome::Genome;
use crate::problem::Problem;
use crate::schedule::{Stop, VehicleSchedule};

/// Turns a genome and cutoff vector into verified vehicle schedules.
pub struct Decoder;

impl Decoder {
    /// Decode the genome into one verified schedule per vehicle.
    ///
    /// Genome indices up to the last cutoff are walked once, in order; the
    /// vehicle pointer advances whenever the index reaches the current
    /// vehicle's cutoff, so a vehicle whose cutoff equals its predecessor's
    /// receives no tasks. Each gene is inserted into a trial copy of its
    /// vehicle's schedule at the positions matching its sampled times; the
    /// trial replaces the schedule only when it verifies, otherwise the
    /// gene is left uncommitted. No insertion is ever retried within the
    /// same pass.
    ///
    /// Every gene's committed vehicle is cleared up front, so decoding the
    /// same genome twice yields identical schedules.
    pub fn decode(genome: &mut Genome, cutoffs: &[usize], problem: &Problem) -> Vec<VehicleSchedule> {
        let baseline = problem.current_time;

        for gene in genome.genes.iter_mut() {
            gene.committed_vehicle = None;
        }

        let mut schedules: Vec<VehicleSchedule> = problem
            .fleet
            .iter()
            .enumerate()
            .map(|(index, vehicle)| {
                VehicleSchedule::seeded(index, &vehicle.committed_stops, baseline)
            })
            .collect();

        let last_cutoff = match cutoffs.last() {
            Some(&last) => last.min(genome.len()),
            None => return schedules,
        };

        let mut vehicle_index = 0;
        for allele in 0..last_cutoff {
            while vehicle_index < cutoffs.len() && allele >= cutoffs[vehicle_index] {
                vehicle_index += 1;
            }
            if vehicle_index >= schedules.len() {
                break;
            }

            let gene = genome.genes[allele];
            let task = &problem.tasks[gene.task];
            let schedule = &schedules[vehicle_index];

            // Find the insertion positions preserving planned-time order,
            // never landing inside the committed prefix. Both scans are
            // bounded by the stop list length.
            let stops = &schedule.stops;
            let mut pickup_position = schedule.fixed_prefix;
            while pickup_position < stops.len() && stops[pickup_position].time < gene.pickup_time {
                pickup_position += 1;
            }

            let mut dropoff_position = pickup_position;
            while dropoff_position < stops.len() && stops[dropoff_position].time < gene.dropoff_time
            {
                dropoff_position += 1;
            }

            let mut candidate = schedule.trial();
            candidate.insert_pair(
                Stop::pickup(task, gene.pickup_time),
                pickup_position,
                Stop::dropoff(task, gene.dropoff_time),
                dropoff_position,
            );

            if candidate.is_feasible(baseline) {
                schedules[vehicle_index] = candidate;
                genome.genes[allele].committed_vehicle = Some(vehicle_index);
            }
        }

        schedules
    }
}
