//! Per-trial metrics and replication summaries.

use repairman_core::scenario::ScenarioParams;
use repairman_core::SimulationReport;
use serde::Serialize;

use crate::parameters::ParameterSet;
use crate::theory::analytic_steady_state;

/// z-value for a two-sided 95% normal interval.
const Z_95: f64 = 1.96;

/// Metrics from a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub num_machines: usize,
    pub num_repairmen: usize,
    pub failure_rate: f64,
    pub repair_rate: f64,
    pub machines_fixed: u64,
    pub elapsed_time: f64,
    pub average_working: f64,
    pub average_busy_repairmen: f64,
    pub repairman_utilization: f64,
    pub events_processed: u64,
    /// Index = number of operational machines.
    pub operational_distribution: Vec<f64>,
}

impl TrialResult {
    pub fn from_report(param_set: &ParameterSet, report: &SimulationReport) -> Self {
        Self {
            experiment_id: param_set.experiment_id.clone(),
            run_id: param_set.run_id,
            seed: param_set.seed,
            num_machines: report.num_machines,
            num_repairmen: report.num_repairmen,
            failure_rate: param_set.params.failure_rate,
            repair_rate: param_set.params.repair_rate,
            machines_fixed: report.machines_fixed,
            elapsed_time: report.elapsed_time,
            average_working: report.average_working,
            average_busy_repairmen: report.average_busy_repairmen,
            repairman_utilization: report.repairman_utilization,
            events_processed: report.events_processed,
            operational_distribution: report.operational_distribution.clone(),
        }
    }

    fn scenario_params(&self) -> ScenarioParams {
        ScenarioParams::default()
            .with_machines(self.num_machines)
            .with_repairmen(self.num_repairmen)
            .with_rates(self.failure_rate, self.repair_rate)
    }
}

/// Sample mean with its spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0 with fewer than two samples.
    pub std_dev: f64,
    /// Half-width of the normal-approximation 95% interval around the mean.
    pub half_width_95: f64,
}

impl Estimate {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                half_width_95: 0.0,
            };
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        if samples.len() < 2 {
            return Self {
                mean,
                std_dev: 0.0,
                half_width_95: 0.0,
            };
        }
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();
        Self {
            mean,
            std_dev,
            half_width_95: Z_95 * std_dev / n.sqrt(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        (value - self.mean).abs() <= self.half_width_95
    }
}

/// Aggregate of all replications sharing one experiment id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub experiment_id: String,
    pub num_machines: usize,
    pub num_repairmen: usize,
    pub failure_rate: f64,
    pub repair_rate: f64,
    pub replications: usize,
    pub average_working: Estimate,
    pub average_busy_repairmen: Estimate,
    pub repairman_utilization: Estimate,
    /// Per-state mean across replications. Index = number of operational machines.
    pub mean_operational_distribution: Vec<f64>,
    /// Closed-form average working machines, when the parameters admit one.
    pub analytic_average_working: Option<f64>,
}

/// Group trial results by experiment id, preserving first-seen order.
pub fn summarize_replications(results: &[TrialResult]) -> Vec<ExperimentSummary> {
    let mut groups: Vec<(&str, Vec<&TrialResult>)> = Vec::new();
    for result in results {
        match groups
            .iter_mut()
            .find(|(id, _)| *id == result.experiment_id.as_str())
        {
            Some((_, members)) => members.push(result),
            None => groups.push((result.experiment_id.as_str(), vec![result])),
        }
    }

    groups
        .into_iter()
        .map(|(experiment_id, members)| summarize_group(experiment_id, &members))
        .collect()
}

fn summarize_group(experiment_id: &str, members: &[&TrialResult]) -> ExperimentSummary {
    let first = members[0];
    let collect =
        |f: fn(&TrialResult) -> f64| -> Vec<f64> { members.iter().map(|r| f(r)).collect() };

    let states = first.operational_distribution.len();
    let mut mean_operational_distribution = vec![0.0; states];
    for member in members {
        for (slot, p) in mean_operational_distribution
            .iter_mut()
            .zip(&member.operational_distribution)
        {
            *slot += p / members.len() as f64;
        }
    }

    ExperimentSummary {
        experiment_id: experiment_id.to_string(),
        num_machines: first.num_machines,
        num_repairmen: first.num_repairmen,
        failure_rate: first.failure_rate,
        repair_rate: first.repair_rate,
        replications: members.len(),
        average_working: Estimate::from_samples(&collect(|r| r.average_working)),
        average_busy_repairmen: Estimate::from_samples(&collect(|r| r.average_busy_repairmen)),
        repairman_utilization: Estimate::from_samples(&collect(|r| r.repairman_utilization)),
        mean_operational_distribution,
        analytic_average_working: analytic_steady_state(&first.scenario_params())
            .ok()
            .map(|s| s.average_working),
    }
}
