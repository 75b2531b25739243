//! Cutline CLI
//!
//! Runs a snapshot trace and writes one artifact per completed round.

use clap::Parser;
use cutline_simulation::SimulationConfig;
use cutline_simulator::{parse_format, Simulator, SimulatorConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cutline")]
#[command(about = "Replay a trace and record Chandy-Lamport snapshots")]
#[command(version)]
struct Cli {
    /// Trace file to replay
    trace: PathBuf,

    /// Directory snapshot files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Snapshot file format (text, json)
    #[arg(long, default_value = "text")]
    format: String,

    /// Buffered messages per channel
    #[arg(long, default_value = "64")]
    channel_capacity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let format = parse_format(&cli.format).map_err(anyhow::Error::msg)?;
    let config = SimulatorConfig::new(cli.output_dir)
        .with_format(format)
        .with_simulation(SimulationConfig::default().with_channel_capacity(cli.channel_capacity));

    let report = Simulator::new(config).run_file(&cli.trace).await?;

    if report.completed_rounds.is_empty() {
        tracing::warn!("No snapshot round completed");
    }
    Ok(())
}
