//! Utility functions and structures for the annealing solver.

use itertools::Itertools;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::problem::Problem;
use crate::schedule::StopKind;
use crate::Solution;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save a solution to a file.
pub fn save_solution<P: AsRef<Path>>(
    solution: &Solution,
    problem: &Problem,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "PDPTW solution for {} tasks", problem.task_count())?;
    writeln!(file, "Fitness: {:.2}", solution.fitness)?;
    writeln!(file, "Revenue: {:.2}", solution.revenue)?;
    writeln!(file, "Cost: {:.2}", solution.cost)?;
    writeln!(
        file,
        "Scheduled tasks: {} / {}",
        solution.scheduled_tasks().len(),
        problem.task_count()
    )?;
    writeln!(file)?;

    for schedule in &solution.schedules {
        write!(file, "Vehicle #{}: ", schedule.vehicle)?;

        if schedule.is_empty() {
            writeln!(file, "idle")?;
            continue;
        }

        let route = schedule
            .stops
            .iter()
            .map(|stop| match stop.kind {
                StopKind::Pickup => format!("pickup {} @{:.1}", stop.task, stop.time),
                StopKind::Dropoff => format!("dropoff {} @{:.1}", stop.task, stop.time),
            })
            .join(" -> ");
        writeln!(file, "{}", route)?;
    }

    Ok(())
}

/// Generate statistics about the search process.
pub struct SearchStatistics {
    pub iterations: u32,
    pub runtime: Duration,
    pub best_fitness: f64,
    pub best_revenue: f64,
    pub best_cost: f64,
    pub scheduled_tasks: usize,
    pub unscheduled_tasks: usize,
    pub final_temperature: f64,
}

impl SearchStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Iterations: {}
- Runtime: {}
- Best Fitness: {:.2}
- Best Revenue: {:.2}
- Best Cost: {:.2}
- Scheduled Tasks: {}
- Unscheduled Tasks: {}
- Final Temperature: {:.4}",
            self.iterations,
            format_duration(self.runtime),
            self.best_fitness,
            self.best_revenue,
            self.best_cost,
            self.scheduled_tasks,
            self.unscheduled_tasks,
            self.final_temperature
        )
    }
}
