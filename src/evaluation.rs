//! Cost and fitness evaluation of decoded solutions.

use crate::genome::Genome;
use crate::problem::{Problem, Vehicle};
use crate::schedule::{StopKind, VehicleSchedule};
use serde::{Deserialize, Serialize};

/// Aggregate result of evaluating a decoded solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Expected revenue minus estimated cost; higher is better.
    pub fitness: f64,
    /// Sum of the committed genes' price entries.
    pub revenue: f64,
    /// Sum of all vehicle costs.
    pub cost: f64,
}

/// Computes per-vehicle costs and aggregate fitness.
pub struct Evaluator;

impl Evaluator {
    /// Estimate the total consumption cost of one vehicle's schedule.
    ///
    /// Walks the stop list with a laden counter: pickups add loading
    /// consumption and raise the counter, dropoffs add unloading
    /// consumption and lower it. Each leg from the previous location to the
    /// stop's location is costed at the laden or ballast rate depending on
    /// the counter after the stop's own adjustment. The interval between
    /// the schedule's completion and the end of the planning horizon is
    /// charged as idle consumption.
    pub fn vehicle_cost(vehicle: &Vehicle, schedule: &VehicleSchedule, problem: &Problem) -> f64 {
        let start_time = problem.current_time;

        let mut loading_costs = 0.0;
        let mut unloading_costs = 0.0;
        let mut travel_costs = 0.0;
        let mut laden: i64 = 0;
        let mut previous_location = vehicle.location;

        for stop in &schedule.stops {
            match stop.kind {
                StopKind::Pickup => {
                    let loading_time = vehicle.loading_time(&stop.cargo);
                    loading_costs += vehicle.loading_consumption(loading_time);
                    laden += 1;
                }
                StopKind::Dropoff => {
                    let loading_time = vehicle.loading_time(&stop.cargo);
                    unloading_costs += vehicle.unloading_consumption(loading_time);
                    laden -= 1;
                }
            }

            // Unreachable pairs come back as a large sentinel distance and
            // simply make this candidate expensive.
            let distance = problem.distance(previous_location, stop.location);
            let travel_time = vehicle.travel_time(distance);
            travel_costs += if laden > 0 {
                vehicle.laden_consumption(travel_time, vehicle.speed)
            } else {
                vehicle.ballast_consumption(travel_time, vehicle.speed)
            };
            previous_location = stop.location;
        }

        let completion_time = schedule.completion_time(start_time);
        let idle_time = (start_time + problem.planning_horizon - completion_time).max(0.0);
        let idle_cost = vehicle.idle_consumption(idle_time);

        loading_costs + unloading_costs + travel_costs + idle_cost
    }

    /// Evaluate a decoded solution.
    ///
    /// Revenue counts each committed gene's price entry for the vehicle it
    /// was committed to; cost sums every vehicle's schedule cost.
    pub fn evaluate(
        genome: &Genome,
        schedules: &[VehicleSchedule],
        problem: &Problem,
    ) -> Evaluation {
        let cost: f64 = schedules
            .iter()
            .zip(&problem.fleet)
            .map(|(schedule, vehicle)| Self::vehicle_cost(vehicle, schedule, problem))
            .sum();

        let revenue: f64 = genome
            .genes
            .iter()
            .filter_map(|gene| {
                gene.committed_vehicle
                    .map(|vehicle| problem.prices[gene.task][vehicle])
            })
            .sum();

        Evaluation {
            fitness: revenue - cost,
            revenue,
            cost,
        }
    }
}
