//! Parallel simulation execution using rayon.
//!
//! Every parameter set runs in its own engine instance; nothing is shared
//! between trials, so they can be spread across a thread pool freely.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use repairman_core::run_simulation;
use tracing::{debug, info};

use crate::error::ExperimentError;
use crate::metrics::TrialResult;
use crate::parameters::ParameterSet;

/// Run a single simulation with the given parameter set.
pub fn run_single_simulation(param_set: &ParameterSet) -> Result<TrialResult, ExperimentError> {
    let report =
        run_simulation(param_set.scenario_params()).map_err(|source| ExperimentError::Trial {
            experiment_id: param_set.experiment_id.clone(),
            run_id: param_set.run_id,
            source,
        })?;
    debug!(
        experiment_id = %param_set.experiment_id,
        run_id = param_set.run_id,
        average_working = report.average_working,
        "trial finished"
    );
    Ok(TrialResult::from_report(param_set, &report))
}

/// Run multiple simulations in parallel with a progress bar.
///
/// Results come back in the same order as `parameter_sets`. `num_threads`
/// of `None` uses rayon's default pool size.
pub fn run_parallel_experiments(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
) -> Result<Vec<TrialResult>, ExperimentError> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple simulations in parallel with optional progress bar.
///
/// The first failing trial (in input order) is returned as the error.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<TrialResult>, ExperimentError> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        let template =
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;
    info!(trials = total, threads = pool.current_num_threads(), "running experiments");

    let pb_clone = pb.clone();
    let results: Vec<Result<TrialResult, ExperimentError>> = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set);
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSpace;
    use repairman_core::scenario::ScenarioParams;

    fn small_base() -> ScenarioParams {
        ScenarioParams::default().with_stop_at_machines_fixed(500)
    }

    #[test]
    fn test_single_simulation() {
        let sets = ParameterSpace::grid().with_base(small_base()).generate();
        let result = run_single_simulation(&sets[0]).expect("trial");

        assert_eq!(result.machines_fixed, 500);
        assert_eq!(result.num_machines, 4);
        assert_eq!(result.experiment_id, "exp_0");
        assert_eq!(result.seed, sets[0].seed);
    }

    #[test]
    fn test_parallel_experiments_preserve_order() {
        let sets = ParameterSpace::grid()
            .with_base(small_base())
            .num_machines(vec![2, 5])
            .num_repairmen(vec![1, 2])
            .generate();
        let results = run_parallel_experiments_with_progress(sets.clone(), Some(2), false)
            .expect("experiments");

        assert_eq!(results.len(), 4);
        for (result, set) in results.iter().zip(&sets) {
            assert_eq!(result.num_machines, set.params.num_machines);
            assert_eq!(result.num_repairmen, set.params.num_repairmen);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sets = ParameterSpace::grid()
            .with_base(small_base())
            .replications(3)
            .generate();
        let parallel =
            run_parallel_experiments_with_progress(sets.clone(), Some(3), false).expect("parallel");
        let sequential: Vec<TrialResult> = sets
            .iter()
            .map(|s| run_single_simulation(s).expect("trial"))
            .collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_invalid_trial_surfaces_error() {
        let sets = ParameterSpace::grid()
            .with_base(small_base())
            .num_repairmen(vec![1, 0])
            .generate();
        let err = run_parallel_experiments_with_progress(sets, Some(1), false)
            .expect_err("zero repairmen");
        assert!(matches!(
            err,
            ExperimentError::Trial { ref experiment_id, .. } if experiment_id == "exp_1"
        ));
    }
}
