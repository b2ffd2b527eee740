use std::path::PathBuf;

use repairman_core::SimError;

/// Errors raised while setting up or executing experiments.
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("experiment `{experiment_id}` run {run_id} failed: {source}")]
    Trial {
        experiment_id: String,
        run_id: usize,
        #[source]
        source: SimError,
    },
}
