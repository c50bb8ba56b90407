use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "solo workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-run the concurrency tests many times to shake out rare interleavings
    Stress {
        /// Number of repetitions
        #[arg(long, default_value_t = 25)]
        runs: u32,

        /// Also run the loom model tests once at the end
        #[arg(long, default_value_t = false)]
        loom: bool,
    },
    /// Run the slot benchmarks
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,
    },
}

const STRESS_TESTS: &[&str] = &["lazy_slot_test", "naive_slot_test", "singleton_test"];

#[derive(Serialize)]
struct StressReport {
    runs: u32,
    failures: Vec<StressFailure>,
    elapsed_ms: u128,
}

#[derive(Serialize)]
struct StressFailure {
    run: u32,
    test: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stress { runs, loom } => {
            let report = run_stress(runs)?;
            write_report(&report)?;
            if !report.failures.is_empty() {
                bail!("{} of {} stress runs failed", report.failures.len(), runs);
            }
            if loom {
                run_loom()?;
            }
        }
        Commands::Bench { quick } => run_benchmarks(quick)?,
    }

    Ok(())
}

fn run_stress(runs: u32) -> Result<StressReport> {
    println!("Compiling tests...");
    let status = Command::new("cargo")
        .args(["test", "--release", "--no-run"])
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        bail!("Failed to compile tests");
    }

    let start = Instant::now();
    let mut failures = Vec::new();
    for run in 1..=runs {
        for test in STRESS_TESTS {
            let status = Command::new("cargo")
                .args(["test", "--release", "--quiet", "--test", test])
                .status()
                .with_context(|| format!("failed to run {test}"))?;
            if !status.success() {
                eprintln!("run {run}: {test} failed");
                failures.push(StressFailure {
                    run,
                    test: (*test).to_owned(),
                });
            }
        }
        println!("run {run}/{runs} done");
    }

    Ok(StressReport {
        runs,
        failures,
        elapsed_ms: start.elapsed().as_millis(),
    })
}

fn run_loom() -> Result<()> {
    println!("\n>>> Running loom models...");
    let status = Command::new("cargo")
        .env("RUSTFLAGS", "--cfg loom")
        .args(["test", "--release", "--test", "loom_slot"])
        .status()
        .context("failed to run loom tests")?;
    if !status.success() {
        bail!("loom model tests failed");
    }
    Ok(())
}

fn write_report(report: &StressReport) -> Result<()> {
    let path = Path::new("target/stress/report.json");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    println!(
        "Stress report written to {} ({} failures in {:.2?})",
        path.display(),
        report.failures.len(),
        Duration::from_millis(u64::try_from(report.elapsed_ms).unwrap_or(u64::MAX)),
    );
    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running slot benchmarks...");
    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.env("CARGO_INCREMENTAL", "0")
        .args(["bench", "--bench", "slot_benchmark"]);

    // Args for the test runner (Criterion) go after --
    cmd.arg("--");
    if quick {
        cmd.arg("--measurement-time").arg("0.1");
        cmd.arg("--noplot");
        cmd.arg("--sample-size").arg("10");
    }

    let status = cmd.status().context("Failed to run slot benchmarks")?;
    if !status.success() {
        bail!("Benchmarks failed");
    }
    println!("Finished in {:.2?}", start.elapsed());
    Ok(())
}
