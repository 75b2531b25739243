//! Configuration types for the simulator.

use cutline_simulation::SimulationConfig;
use cutline_sink::SnapshotFormat;
use std::path::PathBuf;

/// Configuration for one trace run.
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// Directory snapshot artifacts are written to.
    pub output_dir: PathBuf,

    /// Artifact encoding.
    pub format: SnapshotFormat,

    /// Runtime settings for the participant tasks.
    pub simulation: SimulationConfig,
}

impl SimulatorConfig {
    /// Create a configuration writing text artifacts into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: SnapshotFormat::default(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Set the artifact format.
    pub fn with_format(mut self, format: SnapshotFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the simulation runtime settings.
    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Parse a `--format` argument.
pub fn parse_format(s: &str) -> Result<SnapshotFormat, String> {
    match s.to_lowercase().as_str() {
        "text" | "txt" => Ok(SnapshotFormat::Text),
        "json" => Ok(SnapshotFormat::Json),
        _ => Err(format!("Unknown snapshot format: {}", s)),
    }
}
