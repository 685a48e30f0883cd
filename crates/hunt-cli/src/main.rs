//! Runs one epoch of the hunt simulation and writes its report as JSON.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use hunt_core::SimulationConfig;
use hunt_world::{Epoch, SimulationContext};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hunt", about = "Multi-generational predator/prey simulation")]
struct Args {
    /// JSON configuration file; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Size of generation zero
    #[arg(long)]
    size: Option<usize>,

    /// Number of generations to run
    #[arg(long)]
    generations: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write the epoch report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(size) = args.size {
        config.initial_size = size;
    }
    if let Some(generations) = args.generations {
        config.target_iterations = generations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json_logs)?;

    let config = load_config(&args)?;
    info!(
        initial_size = config.initial_size,
        target_iterations = config.target_iterations,
        seed = ?config.seed,
        "Starting hunt simulation"
    );

    let mut ctx = SimulationContext::new(config);
    let mut epoch = Epoch::from_config(&mut ctx);
    let report = epoch.simulate(&mut ctx)?;

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
