use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the machine repairman simulation workspace",
    long_about = "A unified CLI for running simulations, sweeps, benchmarks,\n\
                  and CI checks in the machine repairman workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the classic scenario example (4 machines, 1 repairman)
    Run,
    /// Run the `repairman` CLI, forwarding any extra arguments
    Sim {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run the staffing parameter sweep example
    Sweep,
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run load tests (ignored tests in repairman_core)
    LoadTest,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run examples
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn spawn(program: &str, args: &[&str]) -> ExitStatus {
    eprintln!("+ {program} {}", args.join(" "));
    match Command::new(program).args(args).status() {
        Ok(status) => status,
        Err(err) => {
            eprintln!("failed to execute {program}: {err}");
            exit(1);
        }
    }
}

fn run(program: &str, args: &[&str]) {
    let status = spawn(program, args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_cargo(args: &[&str]) {
    run("cargo", args);
}

fn run_bench(extra: &[&str]) {
    let mut args = vec!["bench", "--package", "repairman_core", "--bench", "performance"];
    if !extra.is_empty() {
        args.push("--");
        args.extend_from_slice(extra);
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test repairman_core");
    run_cargo(&["test", "-p", "repairman_core"]);

    step("Test repairman_experiments");
    run_cargo(&["test", "-p", "repairman_experiments"]);
}

fn ci_examples() {
    step("Run scenario_run (4 machines, 1 repairman)");
    run_cargo(&[
        "run",
        "-p",
        "repairman_core",
        "--example",
        "scenario_run",
        "--release",
    ]);

    step("Run repairman CLI (20 replications)");
    run_cargo(&[
        "run",
        "-p",
        "repairman_experiments",
        "--bin",
        "repairman",
        "--release",
        "--",
        "--machines",
        "10",
        "--repairmen",
        "3",
        "--stop-at",
        "20000",
        "--trials",
        "20",
        "--seed",
        "1",
    ]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_bench(&[]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_cargo(&[
                "run",
                "-p",
                "repairman_core",
                "--example",
                "scenario_run",
                "--release",
            ]);
        }
        Commands::Sim { args } => {
            let mut cargo_args = vec![
                "run",
                "-p",
                "repairman_experiments",
                "--bin",
                "repairman",
                "--release",
                "--",
            ];
            cargo_args.extend(args.iter().map(String::as_str));
            run_cargo(&cargo_args);
        }
        Commands::Sweep => {
            run_cargo(&[
                "run",
                "-p",
                "repairman_experiments",
                "--example",
                "parameter_sweep",
                "--release",
            ]);
        }
        Commands::Bench => run_bench(&[]),
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                if let Err(err) = std::fs::remove_dir_all(baseline_dir) {
                    eprintln!("failed to remove target/criterion: {err}");
                    exit(1);
                }
            }

            step("Stashing current changes");
            run(
                "git",
                &["stash", "push", "-m", "Temporary stash for benchmark comparison"],
            );

            step("Running benchmark to create baseline");
            run_bench(&["--save-baseline", "main"]);

            step("Reapplying changes");
            run("git", &["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_bench(&["--baseline", "main"]);

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::LoadTest => {
            run_cargo(&[
                "test",
                "-p",
                "repairman_core",
                "--test",
                "load_tests",
                "--release",
                "--",
                "--ignored",
            ]);
        }
    }
}
