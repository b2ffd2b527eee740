use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::combinations::{ParameterCombination, ParameterVariations};
use super::{replication_seed, ParameterSet, ParameterSpace};

impl ParameterSpace {
    /// Generate random parameter sets (Monte Carlo sampling).
    ///
    /// Draws up to `count` distinct combinations from the space; each is
    /// replicated like [`ParameterSpace::generate`]. Returns fewer than
    /// `count` combinations when the space itself is smaller.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        let variations = ParameterVariations::from_space(self);
        let target = count.min(variations.combination_count());

        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        let mut picked = Vec::with_capacity(target);
        let mut attempts = 0;
        const MAX_ATTEMPTS: usize = 10_000;

        while picked.len() < target && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let combo = ParameterCombination {
                failure_rate: pick(&variations.failure_rates, &mut rng),
                repair_rate: pick(&variations.repair_rates, &mut rng),
                num_machines: pick(&variations.num_machines, &mut rng),
                num_repairmen: pick(&variations.num_repairmen, &mut rng),
            };
            if seen.insert(combo.key()) {
                picked.push(combo);
            }
        }

        picked
            .into_iter()
            .enumerate()
            .flat_map(|(index, combo)| {
                let params = combo.apply_to(self.base());
                let base_seed = seed.wrapping_add(index as u64);
                (0..self.replication_count()).map(move |run_id| {
                    ParameterSet::new(
                        params.clone(),
                        format!("random_{index}"),
                        run_id,
                        replication_seed(base_seed, run_id),
                    )
                })
            })
            .collect()
    }
}

fn pick<T: Copy>(values: &[T], rng: &mut StdRng) -> T {
    values[rng.gen_range(0..values.len())]
}
