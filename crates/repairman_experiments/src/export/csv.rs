use crate::metrics::{ExperimentSummary, TrialResult};

use super::writer_utils::join_distribution;

pub(crate) fn export_trials_to_csv_impl(
    results: &[TrialResult],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "num_machines",
        "num_repairmen",
        "failure_rate",
        "repair_rate",
        "machines_fixed",
        "elapsed_time",
        "average_working",
        "average_busy_repairmen",
        "repairman_utilization",
        "events_processed",
        "operational_distribution",
    ])?;

    for result in results {
        wtr.write_record([
            result.experiment_id.clone(),
            result.run_id.to_string(),
            result.seed.to_string(),
            result.num_machines.to_string(),
            result.num_repairmen.to_string(),
            result.failure_rate.to_string(),
            result.repair_rate.to_string(),
            result.machines_fixed.to_string(),
            result.elapsed_time.to_string(),
            result.average_working.to_string(),
            result.average_busy_repairmen.to_string(),
            result.repairman_utilization.to_string(),
            result.events_processed.to_string(),
            join_distribution(&result.operational_distribution),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_summaries_to_csv_impl(
    summaries: &[ExperimentSummary],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "num_machines",
        "num_repairmen",
        "failure_rate",
        "repair_rate",
        "replications",
        "average_working_mean",
        "average_working_std_dev",
        "average_working_half_width_95",
        "average_busy_mean",
        "average_busy_half_width_95",
        "utilization_mean",
        "analytic_average_working",
        "mean_operational_distribution",
    ])?;

    for summary in summaries {
        wtr.write_record([
            summary.experiment_id.clone(),
            summary.num_machines.to_string(),
            summary.num_repairmen.to_string(),
            summary.failure_rate.to_string(),
            summary.repair_rate.to_string(),
            summary.replications.to_string(),
            summary.average_working.mean.to_string(),
            summary.average_working.std_dev.to_string(),
            summary.average_working.half_width_95.to_string(),
            summary.average_busy_repairmen.mean.to_string(),
            summary.average_busy_repairmen.half_width_95.to_string(),
            summary.repairman_utilization.mean.to_string(),
            summary
                .analytic_average_working
                .map(|v| v.to_string())
                .unwrap_or_default(),
            join_distribution(&summary.mean_operational_distribution),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
