//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background sweep worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of reminders dispatched concurrently by one sweep.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between delivery-sweep polls.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Maximum reminders fetched per sweep batch.
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            sweep_interval_seconds: default_sweep_interval(),
            sweep_batch_size: default_sweep_batch_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_sweep_batch_size() -> i64 {
    100
}
