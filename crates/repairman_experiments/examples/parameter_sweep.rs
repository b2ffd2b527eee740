//! Example: staffing sweep.
//!
//! Runs the pre-defined staffing space in parallel, summarizes the
//! replications, compares each combination against the analytic value and
//! exports everything to CSV.
//!
//! To use a different parameter space, change the function call in main().

use repairman_experiments::{
    export_summaries_to_csv, export_to_csv, run_parallel_experiments, summarize_replications,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting staffing sweep...");

    // - minimal_space(): classic scenario, replicated
    // - staffing_space(): machines x repairmen
    // - load_space(): failure/repair ratio
    let space = repairman_experiments::parameter_spaces::staffing_space();
    let parameter_sets = space.generate();
    println!("Generated {} parameter sets", parameter_sets.len());

    let results = run_parallel_experiments(parameter_sets, None)?;
    let summaries = summarize_replications(&results);

    println!(
        "\n{:>8} {:>9} {:>18} {:>10} {:>12}",
        "machines", "repairmen", "working (95%)", "analytic", "utilization"
    );
    for summary in &summaries {
        println!(
            "{:>8} {:>9} {:>10.3} ± {:<5.3} {:>10.3} {:>12.3}",
            summary.num_machines,
            summary.num_repairmen,
            summary.average_working.mean,
            summary.average_working.half_width_95,
            summary.analytic_average_working.unwrap_or(f64::NAN),
            summary.repairman_utilization.mean,
        );
    }

    export_to_csv(&results, "staffing_trials.csv")?;
    export_summaries_to_csv(&summaries, "staffing_summary.csv")?;
    println!("\nExported staffing_trials.csv and staffing_summary.csv");

    Ok(())
}
