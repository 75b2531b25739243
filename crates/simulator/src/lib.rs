//! Cutline simulator
//!
//! Loads a trace file, runs it over the concurrent simulation and writes one
//! snapshot artifact per completed round.
//!
//! # Example
//!
//! ```ignore
//! use cutline_simulator::{Simulator, SimulatorConfig};
//!
//! let simulator = Simulator::new(SimulatorConfig::new("out"));
//! let report = simulator.run_file("trace.txt").await?;
//! println!("rounds: {}", report.completed_rounds.len());
//! ```

pub mod config;

pub use config::{parse_format, SimulatorConfig};

use anyhow::Context;
use cutline_simulation::{SimulationReport, SimulationRunner};
use cutline_sink::FileSnapshotSink;
use cutline_trace::Trace;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs traces with file output.
#[derive(Clone, Debug, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator.
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Load and validate `path`, then run it.
    ///
    /// A trace that fails to load is reported before any participant starts.
    pub async fn run_file(&self, path: impl AsRef<Path>) -> anyhow::Result<SimulationReport> {
        let path = path.as_ref();
        let trace =
            Trace::load(path).with_context(|| format!("loading trace {}", path.display()))?;
        self.run(trace).await
    }

    /// Run an already loaded trace.
    pub async fn run(&self, trace: Trace) -> anyhow::Result<SimulationReport> {
        let sink = FileSnapshotSink::new(&self.config.output_dir).with_format(self.config.format);
        info!(output = %sink.dir().display(), format = ?self.config.format, "Writing snapshots");

        let report = SimulationRunner::new(self.config.simulation.clone(), trace, Arc::new(sink))
            .run()
            .await
            .context("running simulation")?;

        for key in &report.completed_rounds {
            info!(round = %key, "Snapshot completed");
        }
        for (key, reason) in &report.failed_rounds {
            warn!(round = %key, error = %reason, "Snapshot not written");
        }
        Ok(report)
    }
}
