//! Machine repairman simulation CLI.
//!
//! # Example
//!
//! ```bash
//! # Classic scenario: 4 machines, 1 repairman, 100 000 repairs
//! repairman --seed 42
//!
//! # 20 replications of a 10-machine shop with 3 repairmen, as JSON
//! repairman -c 10 -r 3 --trials 20 --json
//!
//! # Start from a config file and override the crew size
//! repairman --config shop.json --repairmen 2
//!
//! # Run the pre-defined staffing study and export every trial
//! repairman --space staffing --output staffing.csv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use repairman_core::{run_simulation, ScenarioParams};
use repairman_experiments::config::load_params;
use repairman_experiments::parameter_spaces;
use repairman_experiments::runner::run_parallel_experiments_with_progress;
use repairman_experiments::{
    analytic_steady_state, export_to_csv, export_to_json, summarize_replications, ExperimentError,
    ExperimentSummary, ParameterSpace,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Machine repairman simulation
///
/// Simulates machines that fail at exponential intervals and a crew of
/// repairmen who fix them first-come first-served, then reports time-averaged
/// steady-state statistics.
#[derive(Parser, Debug)]
#[command(name = "repairman")]
#[command(version, about, long_about = None)]
#[command(group(clap::ArgGroup::new("batch").args(["trials", "space"])))]
struct Args {
    /// JSON file with scenario parameters; flags below override its values
    #[arg(long, env = "REPAIRMAN_CONFIG")]
    config: Option<PathBuf>,

    /// Number of machines
    #[arg(short = 'c', long)]
    machines: Option<usize>,

    /// Number of repairmen
    #[arg(short = 'r', long)]
    repairmen: Option<usize>,

    /// Failure rate per operational machine (lambda)
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Repair rate per repairman (mu)
    #[arg(long)]
    repair_rate: Option<f64>,

    /// Stop after this many completed repairs
    #[arg(long)]
    stop_at: Option<u64>,

    /// Random seed for reproducible results. When omitted, seeds from entropy.
    #[arg(long, env = "REPAIRMAN_SEED")]
    seed: Option<u64>,

    /// Run this many independent replications in parallel and summarize them
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    trials: Option<u64>,

    /// Run a pre-defined parameter space instead of a single scenario
    #[arg(
        long,
        conflicts_with_all = ["config", "trials"],
        value_parser = ["minimal", "staffing", "load"]
    )]
    space: Option<String>,

    /// Worker threads for --trials (defaults to the number of cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Write per-trial results to this file (.csv or .json)
    #[arg(long, requires = "batch")]
    output: Option<PathBuf>,

    /// Print machine-readable JSON instead of the text report
    #[arg(long)]
    json: bool,
}

impl Args {
    fn scenario_params(&self) -> Result<ScenarioParams, ExperimentError> {
        let mut params = match &self.config {
            Some(path) => load_params(path)?,
            None => ScenarioParams::default(),
        };
        if let Some(machines) = self.machines {
            params.num_machines = machines;
        }
        if let Some(repairmen) = self.repairmen {
            params.num_repairmen = repairmen;
        }
        if let Some(rate) = self.failure_rate {
            params.failure_rate = rate;
        }
        if let Some(rate) = self.repair_rate {
            params.repair_rate = rate;
        }
        if let Some(target) = self.stop_at {
            params.stop_at_machines_fixed = target;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        Ok(params)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(name) = &args.space {
        let space = parameter_spaces::by_name(name)
            .ok_or_else(|| format!("unknown parameter space `{name}`"))?;
        return run_batch(args, space);
    }

    let params = args.scenario_params()?;
    params.validate()?;

    match args.trials {
        Some(trials) => {
            let space = ParameterSpace::grid()
                .base_seed(params.seed.unwrap_or_else(rand::random))
                .with_base(params)
                .replications(trials as usize);
            run_batch(args, space)
        }
        None => run_single(args, params),
    }
}

fn run_single(args: &Args, params: ScenarioParams) -> Result<(), Box<dyn std::error::Error>> {
    let analytic = analytic_steady_state(&params)?;
    let started = Instant::now();
    let report = run_simulation(params)?;
    let wall_secs = started.elapsed().as_secs_f64();

    if args.json {
        let doc = serde_json::json!({ "report": report, "analytic": analytic });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{report}");
        println!(
            "Analytic average working machines: {:.6}",
            analytic.average_working
        );
        println!(
            "Events processed: {} ({:.0} events/sec)",
            report.events_processed,
            events_per_second(report.events_processed, wall_secs)
        );
    }
    Ok(())
}

fn events_per_second(events: u64, wall_secs: f64) -> f64 {
    if wall_secs > 0.0 {
        events as f64 / wall_secs
    } else {
        0.0
    }
}

fn run_batch(args: &Args, space: ParameterSpace) -> Result<(), Box<dyn std::error::Error>> {
    let results =
        run_parallel_experiments_with_progress(space.generate(), args.threads, !args.json)?;
    let summaries = summarize_replications(&results);

    if let Some(path) = &args.output {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => export_to_json(&results, path)?,
            _ => export_to_csv(&results, path)?,
        }
        info!(path = %path.display(), rows = results.len(), "exported trial results");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
    }
    Ok(())
}

fn print_summary(summary: &ExperimentSummary) {
    println!(
        "{} replications, {} machines, {} repairmen, lambda {}, mu {}",
        summary.replications,
        summary.num_machines,
        summary.num_repairmen,
        summary.failure_rate,
        summary.repair_rate
    );
    println!(
        "Average number working machines: {:.6} ± {:.6} (sd {:.6})",
        summary.average_working.mean,
        summary.average_working.half_width_95,
        summary.average_working.std_dev
    );
    if let Some(analytic) = summary.analytic_average_working {
        println!("Analytic average working machines: {analytic:.6}");
    }
    println!(
        "Average repairmen being utilized: {:.6} ± {:.6}",
        summary.average_busy_repairmen.mean, summary.average_busy_repairmen.half_width_95
    );
    println!("Steady-State probabilities:");
    for (state, p) in summary.mean_operational_distribution.iter().enumerate() {
        println!("    {state}: {p:.6}");
    }
}
