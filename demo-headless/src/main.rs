use clap::{Parser, ValueEnum};
use fhp_core::{run, SimulationConfig, SnapshotOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// 300x100 channel with slip walls, Dirichlet ends and a small obstacle
    Channel,
    /// Torus without walls
    Periodic,
}

/// FHP-I lattice-gas run with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "fhp-demo")]
#[command(about = "Headless FHP lattice-gas simulation", long_about = None)]
struct Args {
    /// Starting configuration
    #[arg(short, long, value_enum, default_value_t = Preset::Channel)]
    preset: Preset,

    /// TOML file with a full configuration (overrides the preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of steps to run
    #[arg(short, long, default_value_t = 100)]
    steps: u64,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns (must divide evenly by the worker count)
    #[arg(long)]
    columns: Option<usize>,

    /// Worker threads, one column partition each
    #[arg(short, long)]
    workers: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for snapshot files
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Write a snapshot every N steps (0 disables snapshots)
    #[arg(long, default_value_t = 10)]
    snapshot_every: u64,

    /// Skip the macroscopic density/velocity files
    #[arg(long)]
    no_macroscopic: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            toml::from_str::<SimulationConfig>(&text).map_err(|e| format!("cannot parse {}: {e}", path.display()))?
        }
        None => match args.preset {
            Preset::Channel => SimulationConfig::channel_flow(),
            Preset::Periodic => SimulationConfig::periodic_box(64, 64),
        },
    };

    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(columns) = args.columns {
        config.columns = columns;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(message) => {
            error!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    let snapshots = SnapshotOptions {
        directory: Some(args.output.clone()),
        interval: args.snapshot_every,
        macroscopic: !args.no_macroscopic,
    };

    match run(&config, args.steps, &snapshots) {
        Ok(summary) => {
            info!(
                "Final occupied count {} (mass {}), {} snapshot file(s) in {}",
                summary.lattice.mass(),
                if summary.mass_conserved() { "conserved" } else { "changed" },
                summary.snapshots.len(),
                args.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
