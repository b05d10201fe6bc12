use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use knight_walk::batch::{BatchConfig, BatchDriver};
use knight_walk::histogram::{Histogram, DEFAULT_BINS};
use knight_walk::report::{self, Report, RunMeta};
use knight_walk::stats::analyze;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "knight-walk",
    version,
    about = "Run a Monte Carlo simulation of a knight's random walk"
)]
struct Args {
    /// Number of simulations to run
    #[arg(long, default_value_t = 1_000_000)]
    simulations: i64,

    /// Number of moves per simulation
    #[arg(long, default_value_t = 50)]
    moves: i64,

    /// Output file for the JSON report (summary + histogram)
    #[arg(long, default_value = "simulation_results.json")]
    output: PathBuf,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (default: sized from the workload, capped at core count)
    #[arg(long)]
    workers: Option<usize>,

    /// Suppress the progress bar and histogram
    #[arg(long)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let start = Instant::now();
    let start_wall = report::now_unix_seconds();
    let cfg = BatchConfig { workers: args.workers, seed: args.seed, ..Default::default() };
    let mut driver = BatchDriver::with_config(cfg);
    let plan = driver.plan(args.simulations.max(1) as usize);

    let pb = if !args.quiet && args.simulations > 0 {
        let pb = ProgressBar::new(args.simulations as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} walks ({eta})",
            )?
            .progress_chars("=>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        driver = driver.with_progress(pb.clone());
        Some(pb)
    } else {
        None
    };

    let outcome = driver.run(args.simulations, args.moves);
    if let Some(pb) = pb { pb.finish_and_clear(); }
    let results = outcome.context("batch run failed")?;
    let elapsed = start.elapsed().as_secs_f64();
    info!(walks = results.len(), elapsed_s = elapsed, "Simulation finished");

    let summary = analyze(&results);
    let histogram = Histogram::from_results(&results, DEFAULT_BINS);

    println!();
    println!("{}", report::format_summary(&summary));
    if !args.quiet {
        println!();
        print!("{}", histogram.render_text(40));
    }

    let meta = RunMeta {
        n_simulations: results.len() as u64,
        n_moves: args.moves as u32,
        workers: plan.workers,
        chunk_size: plan.chunk_size,
        seed: args.seed,
        elapsed_s: elapsed,
        start_unix_s: start_wall,
    };
    let report = Report { meta, summary, histogram };
    report::write_report_to_path(&args.output, &report)
        .with_context(|| format!("failed to write report to {}", args.output.display()))?;
    println!("Histogram saved to {}", args.output.display());
    Ok(())
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("knight_walk=debug,warn")
    } else {
        EnvFilter::new("knight_walk=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}
