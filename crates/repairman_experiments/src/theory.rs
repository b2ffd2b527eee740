//! Closed-form reference values for the finite-source M/M/r//c queue.
//!
//! With `c` machines failing at rate lambda each while operational and `r`
//! repairmen working at rate mu each, the number of broken machines is a
//! birth-death chain with birth rate `(c - n) * lambda` and death rate
//! `min(n, r) * mu`. Its stationary distribution is what a long simulation run
//! should converge to.

use repairman_core::error::ensure_positive_rate;
use repairman_core::scenario::ScenarioParams;
use repairman_core::SimError;
use serde::Serialize;

/// Stationary distribution of the machine repairman model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticSteadyState {
    /// Index = number of operational machines.
    pub operational_distribution: Vec<f64>,
    pub average_working: f64,
    pub average_busy_repairmen: f64,
}

impl AnalyticSteadyState {
    /// Index = number of broken machines.
    pub fn broken_distribution(&self) -> Vec<f64> {
        self.operational_distribution.iter().rev().copied().collect()
    }
}

/// Compute the stationary distribution for `params`.
pub fn analytic_steady_state(params: &ScenarioParams) -> Result<AnalyticSteadyState, SimError> {
    ensure_positive_rate("failure_rate", params.failure_rate)?;
    ensure_positive_rate("repair_rate", params.repair_rate)?;
    if params.num_machines == 0 || params.num_repairmen == 0 {
        return Err(SimError::InvalidArgument {
            name: "population",
            reason: "needs at least one machine and one repairman".into(),
        });
    }

    let c = params.num_machines;
    let r = params.num_repairmen;
    let (lambda, mu) = (params.failure_rate, params.repair_rate);

    // Log weights keep large populations from overflowing.
    let mut log_weights = Vec::with_capacity(c + 1);
    log_weights.push(0.0_f64);
    for broken in 0..c {
        let birth = (c - broken) as f64 * lambda;
        let death = (broken + 1).min(r) as f64 * mu;
        let prev = log_weights[broken];
        log_weights.push(prev + birth.ln() - death.ln());
    }
    let max = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = log_weights.iter().map(|lw| (lw - max).exp()).collect();
    let norm: f64 = weights.iter().sum();
    let by_broken: Vec<f64> = weights.iter().map(|w| w / norm).collect();

    let average_working = by_broken
        .iter()
        .enumerate()
        .map(|(broken, p)| (c - broken) as f64 * p)
        .sum();
    let average_busy_repairmen = by_broken
        .iter()
        .enumerate()
        .map(|(broken, p)| broken.min(r) as f64 * p)
        .sum();

    Ok(AnalyticSteadyState {
        operational_distribution: by_broken.into_iter().rev().collect(),
        average_working,
        average_busy_repairmen,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_machine_splits_by_rates() {
        let params = ScenarioParams::default()
            .with_machines(1)
            .with_repairmen(1)
            .with_rates(1.0, 3.0);
        let steady = analytic_steady_state(&params).expect("valid");
        assert!((steady.operational_distribution[0] - 0.25).abs() < 1e-12);
        assert!((steady.operational_distribution[1] - 0.75).abs() < 1e-12);
        assert!((steady.average_working - 0.75).abs() < 1e-12);
        assert!((steady.average_busy_repairmen - 0.25).abs() < 1e-12);
    }

    #[test]
    fn classic_setup_matches_falling_factorial_form() {
        let steady = analytic_steady_state(&ScenarioParams::default()).expect("valid");
        let rho: f64 = 0.4 / 0.6;
        let weights = [
            1.0,
            4.0 * rho,
            12.0 * rho.powi(2),
            24.0 * rho.powi(3),
            24.0 * rho.powi(4),
        ];
        let norm: f64 = weights.iter().sum();
        let broken = steady.broken_distribution();
        for (n, w) in weights.iter().enumerate() {
            assert!((broken[n] - w / norm).abs() < 1e-12, "state {n}");
        }
    }

    #[test]
    fn little_law_balances_failures_and_repairs() {
        let params = ScenarioParams::default()
            .with_machines(12)
            .with_repairmen(3)
            .with_rates(0.3, 0.8);
        let steady = analytic_steady_state(&params).expect("valid");
        let failure_flow = steady.average_working * params.failure_rate;
        let repair_flow = steady.average_busy_repairmen * params.repair_rate;
        assert!((failure_flow - repair_flow).abs() < 1e-9);
        let total: f64 = steady.operational_distribution.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn large_population_stays_finite() {
        let params = ScenarioParams::default()
            .with_machines(2_000)
            .with_repairmen(5)
            .with_rates(5.0, 0.1);
        let steady = analytic_steady_state(&params).expect("valid");
        assert!(steady.average_working.is_finite());
        assert!((steady.average_busy_repairmen - 5.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_inputs() {
        let zero_rate = ScenarioParams::default().with_rates(0.0, 1.0);
        assert!(analytic_steady_state(&zero_rate).is_err());
        let no_crew = ScenarioParams::default().with_repairmen(0);
        assert!(analytic_steady_state(&no_crew).is_err());
    }
}
