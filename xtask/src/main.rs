use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ride dispatch workspace",
    long_about = "A unified CLI for running the dispatch demo, fleet simulations,\n\
                  benchmarks, load tests and CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dispatch CLI demo walkthrough
    Demo,
    /// Run a seeded fleet simulation through the dispatch CLI
    Simulate {
        #[arg(long, default_value_t = 100)]
        drivers: usize,
        #[arg(long, default_value_t = 500)]
        riders: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// NEAREST or HIGHEST_RATED
        #[arg(long, default_value = "NEAREST")]
        matching: String,
    },
    /// Run the scenario_run example (500 riders, 100 drivers)
    Run,
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
    /// Run load tests (ignored tests in dispatch_core)
    LoadTest,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run the example and CLI commands
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

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn git(args: &[&str]) -> ExitStatus {
    eprintln!("+ git {}", args.join(" "));
    Command::new("git")
        .args(args)
        .status()
        .expect("failed to execute git")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_git(args: &[&str]) {
    let status = git(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_dispatch(args: &[&str]) {
    let mut cargo_args = vec!["run", "-p", "dispatch_cli", "--release", "--"];
    cargo_args.extend_from_slice(args);
    run_cargo(&cargo_args);
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

    step("Test dispatch_core");
    run_cargo(&["test", "-p", "dispatch_core"]);

    step("Test dispatch_cli");
    run_cargo(&["test", "-p", "dispatch_cli"]);
}

fn ci_examples() {
    step("Run scenario_run (500 riders, 100 drivers)");
    run_cargo(&[
        "run",
        "-p",
        "dispatch_core",
        "--example",
        "scenario_run",
        "--release",
    ]);

    step("Run dispatch demo");
    run_dispatch(&["demo"]);

    step("Run dispatch estimate");
    run_dispatch(&[
        "estimate",
        "--pickup",
        "52.52,13.40",
        "--dropoff",
        "52.61,13.40",
        "--vehicle",
        "SEDAN",
        "--surge",
        "1.5",
    ]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&[
        "bench",
        "--package",
        "dispatch_core",
        "--bench",
        "performance",
    ]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => run_dispatch(&["demo"]),
        Commands::Simulate {
            drivers,
            riders,
            seed,
            matching,
        } => {
            let drivers = drivers.to_string();
            let riders = riders.to_string();
            let seed = seed.to_string();
            run_dispatch(&[
                "simulate",
                "--drivers",
                &drivers,
                "--riders",
                &riders,
                "--seed",
                &seed,
                "--matching",
                &matching,
            ]);
        }
        Commands::Run => {
            run_cargo(&[
                "run",
                "-p",
                "dispatch_core",
                "--example",
                "scenario_run",
                "--release",
            ]);
        }
        Commands::Bench => {
            run_cargo(&[
                "bench",
                "--package",
                "dispatch_core",
                "--bench",
                "performance",
            ]);
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                std::fs::remove_dir_all(baseline_dir).expect("failed to remove target/criterion");
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&[
                "bench",
                "--package",
                "dispatch_core",
                "--bench",
                "performance",
                "--",
                "--save-baseline",
                "main",
            ]);

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&[
                "bench",
                "--package",
                "dispatch_core",
                "--bench",
                "performance",
                "--",
                "--baseline",
                "main",
            ]);

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
                "dispatch_core",
                "--test",
                "load_tests",
                "--",
                "--ignored",
            ]);
        }
    }
}
