//! Delivery retry and backoff policy configuration.

use serde::{Deserialize, Serialize};

/// Retry, backoff, and health-threshold policy for reminder delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Maximum number of automatic retries before a failure is terminal.
    #[serde(default = "default_retry_ceiling")]
    pub retry_ceiling: i32,
    /// Per-retry-count wait in minutes; retries beyond the table length
    /// use the last entry.
    #[serde(default = "default_backoff_minutes")]
    pub backoff_minutes: Vec<i64>,
    /// Timeout applied to each channel-sender call, in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,
    /// Trailing-24h success rate below which the health check warns.
    #[serde(default = "default_success_rate_threshold")]
    pub success_rate_threshold: f64,
    /// Minutes after which an in-flight claim is considered abandoned and
    /// released back to pending.
    #[serde(default = "default_stale_claim_minutes")]
    pub stale_claim_minutes: i64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            retry_ceiling: default_retry_ceiling(),
            backoff_minutes: default_backoff_minutes(),
            send_timeout_seconds: default_send_timeout(),
            success_rate_threshold: default_success_rate_threshold(),
            stale_claim_minutes: default_stale_claim_minutes(),
        }
    }
}

fn default_retry_ceiling() -> i32 {
    3
}

fn default_backoff_minutes() -> Vec<i64> {
    vec![1, 5, 15, 30]
}

fn default_send_timeout() -> u64 {
    20
}

fn default_success_rate_threshold() -> f64 {
    0.8
}

fn default_stale_claim_minutes() -> i64 {
    30
}
