//! Time-weighted occupancy of system states.
//!
//! The system state is the number of *operational* machines (0..=c). The
//! broken-count view is derived from it and never accumulated on its own.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

/// Cumulative simulated time spent at each operational count and each busy-repairman count.
#[derive(Debug, Clone, PartialEq, Resource)]
pub struct StateStatistics {
    time_by_operational: Vec<f64>,
    time_by_busy: Vec<f64>,
}

impl StateStatistics {
    pub fn new(machines: usize, repairmen: usize) -> Self {
        Self {
            time_by_operational: vec![0.0; machines + 1],
            time_by_busy: vec![0.0; repairmen + 1],
        }
    }

    /// Charge `elapsed` time to the state observed before the event.
    pub fn record(&mut self, operational: usize, busy: usize, elapsed: f64) {
        debug_assert!(elapsed >= 0.0, "simulation time must not run backwards");
        self.time_by_operational[operational] += elapsed;
        self.time_by_busy[busy] += elapsed;
    }

    pub fn time_in_state(&self, operational: usize) -> f64 {
        self.time_by_operational.get(operational).copied().unwrap_or(0.0)
    }

    pub fn time_with_busy(&self, busy: usize) -> f64 {
        self.time_by_busy.get(busy).copied().unwrap_or(0.0)
    }

    pub fn total_time(&self) -> f64 {
        self.time_by_operational.iter().sum()
    }

    /// Convert accumulated times into long-run fractions over `elapsed_time`.
    pub fn steady_state(&self, elapsed_time: f64) -> SteadyState {
        let fraction = |time: f64| {
            if elapsed_time > 0.0 {
                time / elapsed_time
            } else {
                0.0
            }
        };

        let operational: Vec<f64> = self
            .time_by_operational
            .iter()
            .map(|t| fraction(*t))
            .collect();
        let busy: Vec<f64> = self.time_by_busy.iter().map(|t| fraction(*t)).collect();

        let average_working = operational
            .iter()
            .enumerate()
            .map(|(state, p)| state as f64 * p)
            .sum();
        // Busy counts that never occurred are left out of the average.
        let average_busy = self
            .time_by_busy
            .iter()
            .zip(&busy)
            .enumerate()
            .filter(|(_, (time, _))| **time > 0.0)
            .map(|(count, (_, p))| count as f64 * p)
            .sum();

        SteadyState {
            operational,
            busy,
            average_working,
            average_busy,
        }
    }
}

/// Steady-state estimates derived from [StateStatistics].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteadyState {
    /// `operational[n]` = fraction of time with exactly `n` machines running.
    pub operational: Vec<f64>,
    /// `busy[k]` = fraction of time with exactly `k` repairmen busy.
    pub busy: Vec<f64>,
    pub average_working: f64,
    pub average_busy: f64,
}

impl SteadyState {
    /// `broken()[n]` = fraction of time with exactly `n` machines broken.
    pub fn broken(&self) -> Vec<f64> {
        self.operational.iter().rev().copied().collect()
    }

    pub fn probability_sum(&self) -> f64 {
        self.operational.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_state_weights_by_time() {
        let mut stats = StateStatistics::new(1, 1);
        stats.record(1, 0, 2.0);
        stats.record(0, 1, 1.0);

        assert_eq!(stats.total_time(), 3.0);
        let steady = stats.steady_state(3.0);
        assert!((steady.operational[1] - 2.0 / 3.0).abs() < 1e-12);
        assert!((steady.operational[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((steady.average_working - 2.0 / 3.0).abs() < 1e-12);
        assert!((steady.average_busy - 1.0 / 3.0).abs() < 1e-12);
        assert!((steady.probability_sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn broken_view_is_reversed_operational_view() {
        let mut stats = StateStatistics::new(2, 1);
        stats.record(2, 0, 5.0);
        stats.record(1, 1, 3.0);
        stats.record(0, 1, 2.0);

        let steady = stats.steady_state(10.0);
        assert_eq!(steady.operational, vec![0.2, 0.3, 0.5]);
        assert_eq!(steady.broken(), vec![0.5, 0.3, 0.2]);
    }

    #[test]
    fn zero_elapsed_time_yields_zero_fractions() {
        let stats = StateStatistics::new(3, 2);
        let steady = stats.steady_state(0.0);
        assert!(steady.operational.iter().all(|p| *p == 0.0));
        assert_eq!(steady.average_busy, 0.0);
    }
}
