#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless grid snake simulation.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Overrides, SimulationConfig};

/// Runs the snake under autopilot on a simulated clock and logs each round.
#[derive(Debug, Parser)]
#[command(name = "gridsnake", version, about)]
struct Cli {
    /// TOML file with simulation settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,

    /// Number of grid columns.
    #[arg(long)]
    cols: Option<u32>,

    /// Seed for reproducible food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Tick budget for each round.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Simulated time between ticks, in milliseconds.
    #[arg(long)]
    tick_interval_ms: Option<u64>,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let base = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        base.with_overrides(Overrides {
            rows: self.rows,
            cols: self.cols,
            seed: self.seed,
            max_ticks: self.max_ticks,
            tick_interval_ms: self.tick_interval_ms,
        })
    }
}

/// Entry point for the grid snake command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.simulation_config()?;
    tracing::info!(
        rows = config.rows,
        cols = config.cols,
        seed = ?config.seed,
        rounds = config.rounds,
        "starting simulation"
    );

    let summaries = simulation::run(&config)?;
    let best = summaries.iter().map(|summary| summary.score).max().unwrap_or(0);
    tracing::info!(rounds = summaries.len(), best_score = best, "simulation complete");
    Ok(())
}
