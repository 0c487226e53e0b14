//! Problem definition and data structures for the PDPTW.

use crate::schedule::Stop;
use crate::SolverError;
use itertools::Itertools;
use petgraph::algo::floyd_warshall;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A cargo descriptor: what is carried and how much of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cargo {
    pub cargo_type: usize,
    pub amount: f64,
}

impl Cargo {
    /// Create a new cargo descriptor.
    pub fn new(cargo_type: usize, amount: f64) -> Self {
        Cargo { cargo_type, amount }
    }
}

/// The pickup and dropoff window quadruple of a task.
///
/// Bounds may be absent as announced by the auction side; normalization in
/// [`Problem::new`] replaces every absent bound with a sentinel so that all
/// four are concrete before the solver reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub earliest_pickup: Option<f64>,
    pub latest_pickup: Option<f64>,
    pub earliest_dropoff: Option<f64>,
    pub latest_dropoff: Option<f64>,
}

impl TimeWindow {
    /// Create a window from possibly-absent bounds.
    pub fn new(
        earliest_pickup: Option<f64>,
        latest_pickup: Option<f64>,
        earliest_dropoff: Option<f64>,
        latest_dropoff: Option<f64>,
    ) -> Self {
        TimeWindow {
            earliest_pickup,
            latest_pickup,
            earliest_dropoff,
            latest_dropoff,
        }
    }

    /// Create a window with all four bounds present.
    pub fn bounded(
        earliest_pickup: f64,
        latest_pickup: f64,
        earliest_dropoff: f64,
        latest_dropoff: f64,
    ) -> Self {
        TimeWindow {
            earliest_pickup: Some(earliest_pickup),
            latest_pickup: Some(latest_pickup),
            earliest_dropoff: Some(earliest_dropoff),
            latest_dropoff: Some(latest_dropoff),
        }
    }

    /// The pickup window as concrete bounds.
    ///
    /// Absent bounds fall back to infinities; after normalization this
    /// cannot happen.
    pub fn pickup_bounds(&self) -> (f64, f64) {
        (
            self.earliest_pickup.unwrap_or(f64::NEG_INFINITY),
            self.latest_pickup.unwrap_or(f64::INFINITY),
        )
    }

    /// The dropoff window as concrete bounds.
    pub fn dropoff_bounds(&self) -> (f64, f64) {
        (
            self.earliest_dropoff.unwrap_or(f64::NEG_INFINITY),
            self.latest_dropoff.unwrap_or(f64::INFINITY),
        )
    }

    /// Check if all four bounds are present.
    pub fn is_bounded(&self) -> bool {
        self.earliest_pickup.is_some()
            && self.latest_pickup.is_some()
            && self.earliest_dropoff.is_some()
            && self.latest_dropoff.is_some()
    }

    /// Iterate over the bounds that are present.
    fn observed(&self) -> impl Iterator<Item = f64> + '_ {
        [
            self.earliest_pickup,
            self.latest_pickup,
            self.earliest_dropoff,
            self.latest_dropoff,
        ]
        .into_iter()
        .flatten()
    }

    /// Replace absent earliest bounds with the floor and absent latest
    /// bounds with the ceiling.
    fn fill(&mut self, floor: f64, ceiling: f64) {
        self.earliest_pickup.get_or_insert(floor);
        self.latest_pickup.get_or_insert(ceiling);
        self.earliest_dropoff.get_or_insert(floor);
        self.latest_dropoff.get_or_insert(ceiling);
    }
}

/// A pickup-and-delivery obligation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Caller-assigned identifier, unique within a problem.
    pub id: usize,
    /// Location index where the cargo is picked up.
    pub origin: usize,
    /// Location index where the cargo is dropped off.
    pub destination: usize,
    pub cargo: Cargo,
    pub window: TimeWindow,
}

impl Task {
    /// Create a new task.
    pub fn new(
        id: usize,
        origin: usize,
        destination: usize,
        cargo: Cargo,
        window: TimeWindow,
    ) -> Self {
        Task {
            id,
            origin,
            destination,
            cargo,
            window,
        }
    }
}

/// A vehicle of the fleet, acting as the cost oracle for its own loading,
/// travel and idle consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: usize,
    /// Current location index.
    pub location: usize,
    /// Travel speed, distance units per time unit. Must be positive.
    pub speed: f64,
    /// Cargo units handled per time unit when no per-type rate is set.
    pub loading_rate: f64,
    /// Per-cargo-type loading rate overrides.
    pub cargo_rates: HashMap<usize, f64>,
    /// Consumption per time unit while loading.
    pub loading_consumption_rate: f64,
    /// Consumption per time unit while unloading.
    pub unloading_consumption_rate: f64,
    /// Consumption rate while travelling with cargo aboard.
    pub laden_rate: f64,
    /// Consumption rate while travelling empty.
    pub ballast_rate: f64,
    /// Consumption per time unit spent idle.
    pub idle_rate: f64,
    /// Stops already contracted to this vehicle before the current run.
    pub committed_stops: Vec<Stop>,
}

impl Vehicle {
    /// Create a new vehicle with default consumption rates.
    pub fn new(id: usize, location: usize, speed: f64) -> Self {
        Vehicle {
            id,
            location,
            speed,
            loading_rate: 10.0,
            cargo_rates: HashMap::new(),
            loading_consumption_rate: 1.0,
            unloading_consumption_rate: 1.0,
            laden_rate: 2.0,
            ballast_rate: 1.0,
            idle_rate: 0.1,
            committed_stops: Vec::new(),
        }
    }

    /// Time needed to load or unload the given cargo.
    pub fn loading_time(&self, cargo: &Cargo) -> f64 {
        let rate = self
            .cargo_rates
            .get(&cargo.cargo_type)
            .copied()
            .unwrap_or(self.loading_rate);
        cargo.amount / rate
    }

    /// Consumption for a loading operation of the given duration.
    pub fn loading_consumption(&self, time: f64) -> f64 {
        self.loading_consumption_rate * time
    }

    /// Consumption for an unloading operation of the given duration.
    pub fn unloading_consumption(&self, time: f64) -> f64 {
        self.unloading_consumption_rate * time
    }

    /// Time needed to cover the given distance.
    pub fn travel_time(&self, distance: f64) -> f64 {
        distance / self.speed
    }

    /// Consumption for travelling the given time with cargo aboard.
    pub fn laden_consumption(&self, time: f64, speed: f64) -> f64 {
        self.laden_rate * time * speed
    }

    /// Consumption for travelling the given time without cargo.
    pub fn ballast_consumption(&self, time: f64, speed: f64) -> f64 {
        self.ballast_rate * time * speed
    }

    /// Consumption for sitting idle for the given duration.
    pub fn idle_consumption(&self, time: f64) -> f64 {
        self.idle_rate * time
    }
}

/// Network distances between locations.
///
/// Missing or out-of-range pairs report [`DistanceMatrix::UNREACHABLE`]
/// instead of failing, so an unreachable leg degrades the cost of a
/// candidate rather than aborting the evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrix {
    distances: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Sentinel distance for unreachable location pairs.
    pub const UNREACHABLE: f64 = 1e9;

    /// Create a matrix from precomputed pairwise distances.
    ///
    /// Non-finite entries are replaced with the unreachable sentinel.
    pub fn new(mut distances: Vec<Vec<f64>>) -> Self {
        for row in distances.iter_mut() {
            for value in row.iter_mut() {
                if !value.is_finite() || *value >= Self::UNREACHABLE {
                    *value = Self::UNREACHABLE;
                }
            }
        }
        DistanceMatrix { distances }
    }

    /// Precompute all-pairs distances from a weighted location network.
    ///
    /// Edges are undirected `(a, b, distance)` triples. Pairs with no
    /// connecting path get the unreachable sentinel. Edges naming a
    /// location outside `0..location_count` are ignored.
    pub fn from_network(
        location_count: usize,
        edges: &[(usize, usize, f64)],
    ) -> Result<Self, SolverError> {
        let mut graph = UnGraph::<(), f64>::default();
        let nodes: Vec<NodeIndex> = (0..location_count).map(|_| graph.add_node(())).collect();

        for &(a, b, weight) in edges {
            if a < location_count && b < location_count {
                graph.add_edge(nodes[a], nodes[b], weight);
            }
        }

        let paths =
            floyd_warshall(&graph, |edge| *edge.weight()).map_err(|_| SolverError::NegativeCycle)?;

        let mut distances = vec![vec![Self::UNREACHABLE; location_count]; location_count];
        for (i, &from) in nodes.iter().enumerate() {
            for (j, &to) in nodes.iter().enumerate() {
                if let Some(&length) = paths.get(&(from, to)) {
                    if length.is_finite() && length < Self::UNREACHABLE {
                        distances[i][j] = length;
                    }
                }
            }
        }

        Ok(DistanceMatrix { distances })
    }

    /// Distance between two locations, or the unreachable sentinel.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.distances
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(Self::UNREACHABLE)
    }

    /// Number of locations covered by the matrix.
    pub fn location_count(&self) -> usize {
        self.distances.len()
    }
}

/// Replace absent window bounds across all tasks with sentinel values.
///
/// The floor is the minimum observed bound minus one, the ceiling the
/// maximum observed bound plus one. When no task carries any bound, the
/// current time and the end of the planning horizon are used instead.
pub fn normalize_windows(tasks: &mut [Task], current_time: f64, planning_horizon: f64) {
    let observed = tasks.iter().flat_map(|task| task.window.observed());

    let (floor, ceiling) = match observed.minmax().into_option() {
        Some((min, max)) => (min - 1.0, max + 1.0),
        None => (current_time, current_time + planning_horizon),
    };

    for task in tasks.iter_mut() {
        task.window.fill(floor, ceiling);
    }
}

/// A PDPTW problem instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub tasks: Vec<Task>,
    pub fleet: Vec<Vehicle>,
    /// Candidate revenue per task and vehicle, `prices[task][vehicle]`,
    /// produced by the pricing side and only read here.
    pub prices: Vec<Vec<f64>>,
    pub distances: DistanceMatrix,
    /// Baseline clock for decoding and idle-cost accounting.
    pub current_time: f64,
    /// Length of the planning period measured from the baseline.
    pub planning_horizon: f64,
}

impl Problem {
    /// Default planning horizon in time units.
    pub const DEFAULT_PLANNING_HORIZON: f64 = 720.0;

    /// Create a new problem instance.
    ///
    /// Validates the price matrix shape and the ordering of provided window
    /// bounds, then normalizes absent bounds.
    pub fn new(
        mut tasks: Vec<Task>,
        fleet: Vec<Vehicle>,
        prices: Vec<Vec<f64>>,
        distances: DistanceMatrix,
        current_time: f64,
    ) -> Result<Self, SolverError> {
        if prices.len() != tasks.len() {
            return Err(SolverError::PriceRowCount {
                rows: prices.len(),
                tasks: tasks.len(),
            });
        }

        for (index, row) in prices.iter().enumerate() {
            if row.len() != fleet.len() {
                return Err(SolverError::PriceRowWidth {
                    task: index,
                    entries: row.len(),
                    vehicles: fleet.len(),
                });
            }
        }

        for task in &tasks {
            let window = &task.window;
            if let (Some(earliest), Some(latest)) = (window.earliest_pickup, window.latest_pickup) {
                if earliest > latest {
                    return Err(SolverError::InvertedWindow {
                        task: task.id,
                        which: "pickup",
                    });
                }
            }
            if let (Some(earliest), Some(latest)) = (window.earliest_dropoff, window.latest_dropoff)
            {
                if earliest > latest {
                    return Err(SolverError::InvertedWindow {
                        task: task.id,
                        which: "dropoff",
                    });
                }
            }
        }

        normalize_windows(&mut tasks, current_time, Self::DEFAULT_PLANNING_HORIZON);

        Ok(Problem {
            tasks,
            fleet,
            prices,
            distances,
            current_time,
            planning_horizon: Self::DEFAULT_PLANNING_HORIZON,
        })
    }

    /// Get the number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Get the number of vehicles in the fleet.
    pub fn vehicle_count(&self) -> usize {
        self.fleet.len()
    }

    /// Distance between two locations, or the unreachable sentinel.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }
}
