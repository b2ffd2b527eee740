use repairman_core::scenario::ScenarioParams;

use super::ParameterSpace;

/// A single point of the parameter grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct ParameterCombination {
    pub failure_rate: f64,
    pub repair_rate: f64,
    pub num_machines: usize,
    pub num_repairmen: usize,
}

impl ParameterCombination {
    pub fn apply_to(&self, base: &ScenarioParams) -> ScenarioParams {
        let mut params = base.clone();
        params.failure_rate = self.failure_rate;
        params.repair_rate = self.repair_rate;
        params.num_machines = self.num_machines;
        params.num_repairmen = self.num_repairmen;
        params
    }

    /// Bit-exact key for de-duplicating sampled combinations.
    pub fn key(&self) -> (u64, u64, usize, usize) {
        (
            self.failure_rate.to_bits(),
            self.repair_rate.to_bits(),
            self.num_machines,
            self.num_repairmen,
        )
    }
}

/// Per-dimension value lists with empty dimensions filled from the base params.
pub(super) struct ParameterVariations {
    pub failure_rates: Vec<f64>,
    pub repair_rates: Vec<f64>,
    pub num_machines: Vec<usize>,
    pub num_repairmen: Vec<usize>,
}

fn or_base<T: Clone>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

impl ParameterVariations {
    pub fn from_space(space: &ParameterSpace) -> Self {
        Self {
            failure_rates: or_base(&space.failure_rates, space.base.failure_rate),
            repair_rates: or_base(&space.repair_rates, space.base.repair_rate),
            num_machines: or_base(&space.num_machines, space.base.num_machines),
            num_repairmen: or_base(&space.num_repairmen, space.base.num_repairmen),
        }
    }

    /// Cartesian product, machines varying slowest and repair rate fastest.
    pub fn generate_combinations(&self) -> impl Iterator<Item = ParameterCombination> + '_ {
        self.num_machines.iter().flat_map(move |&num_machines| {
            self.num_repairmen.iter().flat_map(move |&num_repairmen| {
                self.failure_rates.iter().flat_map(move |&failure_rate| {
                    self.repair_rates
                        .iter()
                        .map(move |&repair_rate| ParameterCombination {
                            failure_rate,
                            repair_rate,
                            num_machines,
                            num_repairmen,
                        })
                })
            })
        })
    }

    pub fn combination_count(&self) -> usize {
        self.failure_rates.len()
            * self.repair_rates.len()
            * self.num_machines.len()
            * self.num_repairmen.len()
    }
}
