//! Parameter variation framework for repairman experiments.
//!
//! A [`ParameterSpace`] lists the values to explore for each dimension
//! (failure rate, repair rate, machine count, repairman count) on top of a base
//! [`ScenarioParams`]. [`ParameterSpace::generate`] expands the full grid and
//! [`ParameterSpace::sample_random`] draws a Monte Carlo subset. Every
//! combination is repeated `replications` times with distinct seeds.

use repairman_core::scenario::ScenarioParams;

mod combinations;
mod sampling;


/// Multiplier used to spread experiment ids over the seed space.
const SEED_STRIDE: u64 = 0x9e37_79b9;

/// One runnable configuration: scenario params plus its identity and seed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParameterSet {
    pub params: ScenarioParams,
    /// Shared by all replications of the same combination.
    pub experiment_id: String,
    /// Replication index within the experiment.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(params: ScenarioParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Get the scenario params with seed applied.
    pub fn scenario_params(&self) -> ScenarioParams {
        let mut params = self.params.clone();
        params.seed = Some(self.seed);
        params
    }
}

pub(crate) fn replication_seed(base: u64, run_id: usize) -> u64 {
    base.wrapping_mul(SEED_STRIDE).wrapping_add(run_id as u64)
}

/// Defines a parameter space for exploration.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    /// Base parameters (used for every dimension left empty).
    base: ScenarioParams,
    failure_rates: Vec<f64>,
    repair_rates: Vec<f64>,
    num_machines: Vec<usize>,
    num_repairmen: Vec<usize>,
    replications: usize,
    base_seed: u64,
}

impl ParameterSpace {
    /// Create a new parameter space with default base parameters.
    pub fn new() -> Self {
        Self {
            base: ScenarioParams::default(),
            failure_rates: vec![],
            repair_rates: vec![],
            num_machines: vec![],
            num_repairmen: vec![],
            replications: 1,
            base_seed: 0,
        }
    }

    /// Create a new parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    /// Set the base parameters that unspecified dimensions fall back to.
    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    pub fn failure_rate(mut self, rates: Vec<f64>) -> Self {
        self.failure_rates = rates;
        self
    }

    pub fn repair_rate(mut self, rates: Vec<f64>) -> Self {
        self.repair_rates = rates;
        self
    }

    pub fn num_machines(mut self, counts: Vec<usize>) -> Self {
        self.num_machines = counts;
        self
    }

    pub fn num_repairmen(mut self, counts: Vec<usize>) -> Self {
        self.num_repairmen = counts;
        self
    }

    /// Number of independently seeded runs per combination (at least 1).
    pub fn replications(mut self, count: usize) -> Self {
        self.replications = count.max(1);
        self
    }

    /// Shift every generated seed so separate studies draw different streams.
    pub fn base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    pub fn base(&self) -> &ScenarioParams {
        &self.base
    }

    pub fn replication_count(&self) -> usize {
        self.replications
    }

    /// Generate every combination (Cartesian product), each replicated.
    pub fn generate(&self) -> Vec<ParameterSet> {
        combinations::ParameterVariations::from_space(self)
            .generate_combinations()
            .enumerate()
            .flat_map(|(experiment_id, combo)| {
                let params = combo.apply_to(&self.base);
                (0..self.replications).map(move |run_id| {
                    ParameterSet::new(
                        params.clone(),
                        format!("exp_{experiment_id}"),
                        run_id,
                        replication_seed(self.base_seed.wrapping_add(experiment_id as u64), run_id),
                    )
                })
            })
            .collect()
    }
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}
