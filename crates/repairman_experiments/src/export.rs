//! Result export to CSV and JSON.

use std::path::Path;

use crate::metrics::{ExperimentSummary, TrialResult};

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export per-trial results to CSV, one row per run.
///
/// The operational distribution is written as a single space-separated cell.
///
/// # Errors
///
/// Returns an error if `results` is empty or the file cannot be written.
pub fn export_to_csv(
    results: &[TrialResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_trials_to_csv_impl(results, file)
}

/// Export replication summaries to CSV, one row per experiment.
pub fn export_summaries_to_csv(
    summaries: &[ExperimentSummary],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(summaries)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_summaries_to_csv_impl(summaries, file)
}

/// Export per-trial results as a pretty-printed JSON array.
pub fn export_to_json(
    results: &[TrialResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}

/// Export replication summaries as a pretty-printed JSON array.
pub fn export_summaries_to_json(
    summaries: &[ExperimentSummary],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(summaries, file)
}
