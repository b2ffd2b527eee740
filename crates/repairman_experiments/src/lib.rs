//! Replications and parameter sweeps for the machine repairman simulation.
//!
//! Each trial is an independent engine instance from `repairman_core`, so
//! trials run in parallel on a rayon pool. Results can be summarized per
//! experiment (mean, standard deviation, 95% half-width), compared with the
//! closed-form finite-source queue, and exported to CSV or JSON.
//!
//! # Quick Start
//!
//! ```no_run
//! use repairman_experiments::{run_parallel_experiments, summarize_replications, ParameterSpace};
//!
//! let space = ParameterSpace::grid()
//!     .num_repairmen(vec![1, 2, 3])
//!     .replications(10);
//!
//! let results = run_parallel_experiments(space.generate(), None).unwrap();
//! for summary in summarize_replications(&results) {
//!     println!(
//!         "{} repairmen: {:.3} ± {:.3} working",
//!         summary.num_repairmen,
//!         summary.average_working.mean,
//!         summary.average_working.half_width_95
//!     );
//! }
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: grid and random sampling over scenario parameters
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: per-trial results and replication summaries
//! - [`theory`]: analytic M/M/r//c reference values
//! - [`export`]: CSV and JSON writers
//! - [`config`]: JSON scenario files

pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod parameter_spaces;
pub mod parameters;
pub mod runner;
pub mod theory;

pub use error::ExperimentError;
pub use export::{export_summaries_to_csv, export_summaries_to_json, export_to_csv, export_to_json};
pub use metrics::{summarize_replications, Estimate, ExperimentSummary, TrialResult};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{run_parallel_experiments, run_single_simulation};
pub use theory::{analytic_steady_state, AnalyticSteadyState};
