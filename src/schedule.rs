//! Vehicle schedule representation and feasibility checking.

use crate::problem::{Cargo, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The kind of service event a stop performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    Pickup,
    Dropoff,
}

/// One service event in a vehicle schedule.
///
/// A stop carries its own window bounds so that a stop sequence can be
/// verified without looking back into the problem instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Identifier of the task being serviced, used to pair pickups with
    /// dropoffs.
    pub task: usize,
    pub kind: StopKind,
    /// Planned service time, sampled by the encoder.
    pub time: f64,
    /// Earliest allowed service time.
    pub earliest: f64,
    /// Latest allowed service time.
    pub latest: f64,
    /// Location visited by this stop.
    pub location: usize,
    pub cargo: Cargo,
}

impl Stop {
    /// Create the pickup stop of a task at the given planned time.
    pub fn pickup(task: &Task, time: f64) -> Self {
        let (earliest, latest) = task.window.pickup_bounds();
        Stop {
            task: task.id,
            kind: StopKind::Pickup,
            time,
            earliest,
            latest,
            location: task.origin,
            cargo: task.cargo,
        }
    }

    /// Create the dropoff stop of a task at the given planned time.
    pub fn dropoff(task: &Task, time: f64) -> Self {
        let (earliest, latest) = task.window.dropoff_bounds();
        Stop {
            task: task.id,
            kind: StopKind::Dropoff,
            time,
            earliest,
            latest,
            location: task.destination,
            cargo: task.cargo,
        }
    }
}

/// The planned stop sequence of one vehicle.
///
/// The owning vehicle is referenced by index rather than held as a live
/// reference, so trial copies stay cheap and free of side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSchedule {
    /// Index of the owning vehicle within the fleet.
    pub vehicle: usize,
    /// Stops in planned service order.
    pub stops: Vec<Stop>,
    /// Number of leading stops that were committed before this run.
    /// Insertions never land inside this prefix, and its dropoffs are
    /// exempt from the pickup-before-dropoff rule.
    pub fixed_prefix: usize,
}

impl VehicleSchedule {
    /// Create a new, empty schedule for the given vehicle.
    pub fn new(vehicle: usize) -> Self {
        VehicleSchedule {
            vehicle,
            stops: Vec::new(),
            fixed_prefix: 0,
        }
    }

    /// Create a schedule seeded from a vehicle's committed stops.
    ///
    /// Committed stop timestamps are coerced to the baseline clock and
    /// their windows widened, so new stops always order after them and the
    /// prefix can never fail verification on its own.
    pub fn seeded(vehicle: usize, committed: &[Stop], baseline: f64) -> Self {
        let stops: Vec<Stop> = committed
            .iter()
            .map(|stop| Stop {
                time: baseline,
                earliest: baseline,
                latest: f64::INFINITY,
                ..*stop
            })
            .collect();

        VehicleSchedule {
            vehicle,
            fixed_prefix: stops.len(),
            stops,
        }
    }

    /// Create an independent trial copy of this schedule.
    pub fn trial(&self) -> Self {
        self.clone()
    }

    /// Insert a pickup/dropoff pair at the given positions.
    ///
    /// Both positions refer to the stop list before insertion, with
    /// `pickup_position <= dropoff_position`; after insertion the pickup
    /// always precedes the dropoff.
    pub fn insert_pair(
        &mut self,
        pickup: Stop,
        pickup_position: usize,
        dropoff: Stop,
        dropoff_position: usize,
    ) {
        self.stops.insert(dropoff_position, dropoff);
        self.stops.insert(pickup_position, pickup);
    }

    /// Verify the stop sequence against time windows and pickup/dropoff
    /// pairing.
    ///
    /// The clock starts at `start_clock`, advances to each stop's earliest
    /// bound, and the sequence fails as soon as the clock passes a stop's
    /// latest bound or a dropoff precedes its pickup.
    pub fn is_feasible(&self, start_clock: f64) -> bool {
        let mut clock = start_clock;
        let mut carried: HashSet<usize> = HashSet::new();

        for (index, stop) in self.stops.iter().enumerate() {
            clock = clock.max(stop.earliest);
            if clock > stop.latest {
                return false;
            }

            match stop.kind {
                StopKind::Pickup => {
                    carried.insert(stop.task);
                }
                StopKind::Dropoff => {
                    // A committed dropoff may pair with a pickup that
                    // happened before this run.
                    if !carried.remove(&stop.task) && index >= self.fixed_prefix {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Time at which the last planned stop is serviced, or the baseline
    /// for an empty schedule.
    pub fn completion_time(&self, baseline: f64) -> f64 {
        self.stops.iter().map(|stop| stop.time).fold(baseline, f64::max)
    }

    /// Simplified view of the schedule as `(kind, task)` pairs.
    pub fn simple_schedule(&self) -> Vec<(StopKind, usize)> {
        self.stops.iter().map(|stop| (stop.kind, stop.task)).collect()
    }

    /// Number of stops in the schedule.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Check if the schedule has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
