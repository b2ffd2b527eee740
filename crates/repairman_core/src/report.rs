use std::fmt;

use bevy_ecs::prelude::World;
use serde::Serialize;

use crate::clock::SimulationClock;
use crate::ecs::{Population, RepairProgress};
use crate::profiling::EventMetrics;
use crate::statistics::StateStatistics;

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub num_machines: usize,
    pub num_repairmen: usize,
    pub machines_fixed: u64,
    /// Simulated time from start to the last processed event.
    pub elapsed_time: f64,
    pub average_working: f64,
    /// Average number of busy repairmen.
    pub average_busy_repairmen: f64,
    /// `average_busy_repairmen / num_repairmen`.
    pub repairman_utilization: f64,
    /// Index = number of operational machines.
    pub operational_distribution: Vec<f64>,
    /// Index = number of busy repairmen.
    pub busy_distribution: Vec<f64>,
    pub events_processed: u64,
}

impl SimulationReport {
    pub fn from_world(world: &World) -> Self {
        let population = *world.resource::<Population>();
        let elapsed_time = world.resource::<SimulationClock>().now();
        let steady = world.resource::<StateStatistics>().steady_state(elapsed_time);
        let events_processed = world
            .get_resource::<EventMetrics>()
            .map(|m| m.events_processed)
            .unwrap_or(0);

        Self {
            num_machines: population.machines,
            num_repairmen: population.repairmen,
            machines_fixed: world.resource::<RepairProgress>().machines_fixed,
            elapsed_time,
            average_working: steady.average_working,
            average_busy_repairmen: steady.average_busy,
            repairman_utilization: steady.average_busy / population.repairmen as f64,
            operational_distribution: steady.operational,
            busy_distribution: steady.busy,
            events_processed,
        }
    }

    /// Index = number of broken machines.
    pub fn broken_distribution(&self) -> Vec<f64> {
        self.operational_distribution.iter().rev().copied().collect()
    }

    pub fn average_broken(&self) -> f64 {
        self.num_machines as f64 - self.average_working
    }

    pub fn probability_sum(&self) -> f64 {
        self.operational_distribution.iter().sum()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} machines fixed in {:.4}",
            self.machines_fixed, self.elapsed_time
        )?;
        writeln!(f, "Average number working machines: {:.6}", self.average_working)?;
        writeln!(
            f,
            "Average repairmen being utilized: {:.6}",
            self.average_busy_repairmen
        )?;
        writeln!(f, "Steady-State probabilities:")?;
        for (state, p) in self.operational_distribution.iter().enumerate() {
            writeln!(f, "    {state}: {p:.6}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SimulationReport {
        SimulationReport {
            num_machines: 2,
            num_repairmen: 1,
            machines_fixed: 3,
            elapsed_time: 10.0,
            average_working: 1.3,
            average_busy_repairmen: 0.5,
            repairman_utilization: 0.5,
            operational_distribution: vec![0.2, 0.3, 0.5],
            busy_distribution: vec![0.5, 0.5],
            events_processed: 7,
        }
    }

    #[test]
    fn broken_view_is_derived() {
        let report = report();
        assert_eq!(report.broken_distribution(), vec![0.5, 0.3, 0.2]);
        assert!((report.average_broken() - 0.7).abs() < 1e-12);
        assert!((report.probability_sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn display_lists_every_state() {
        let text = report().to_string();
        assert!(text.starts_with("3 machines fixed in 10.0000\n"));
        assert!(text.contains("Average number working machines: 1.300000"));
        assert!(text.contains("Average repairmen being utilized: 0.500000"));
        assert!(text.contains("    0: 0.200000\n"));
        assert!(text.contains("    2: 0.500000\n"));
    }
}
