//! Configuration for a simulation run.

use std::time::Duration;

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Buffer size of every channel. A full buffer blocks the sender.
    pub channel_capacity: usize,

    /// Real time one trace "second" of `WAIT` lasts.
    pub wait_unit: Duration,
}

impl SimulationConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channel buffer size.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the duration of one wait unit.
    pub fn with_wait_unit(mut self, unit: Duration) -> Self {
        self.wait_unit = unit;
        self
    }

    /// Real duration of `WAIT:seconds`, saturating on overflow.
    pub fn wait_duration(&self, seconds: u64) -> Duration {
        u32::try_from(seconds)
            .ok()
            .and_then(|n| self.wait_unit.checked_mul(n))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            wait_unit: Duration::from_secs(1),
        }
    }
}
