//! Health and reconciliation check.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use careminder_core::config::channels::ChannelsConfig;
use careminder_core::config::delivery::DeliveryConfig;
use careminder_core::result::AppResult;
use careminder_database::store::{DeliveryStore, ReminderStore};
use careminder_entity::delivery::DeliveryStatus;

use crate::dispatch::{DeliveryDispatcher, DispatchOutcome};

/// Result of one health/reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
    /// Successful deliveries in the trailing 24 hours.
    pub sent_count: i64,
    /// Failed deliveries in the trailing 24 hours.
    pub failed_count: i64,
    /// sent / (sent + failed); `None` with zero attempts.
    pub success_rate: Option<f64>,
    /// Whether the success rate fell below the configured threshold.
    pub below_threshold: bool,
    /// In-flight claims released after their worker died.
    pub released_stale: u64,
    /// Failed reminders requeued for another attempt.
    pub requeued: u64,
    /// Reminders delivered by the immediate re-dispatch pass.
    pub redispatched: u64,
    /// Missing-credential warnings from the configuration audit.
    pub config_warnings: Vec<String>,
}

/// Periodic audit of delivery health plus the retry/reconciliation sweep.
///
/// This is the poller that consumes the backoff windows the dispatcher
/// records: failed reminders under the retry ceiling whose window has
/// elapsed are put back in front of the dispatcher here.
#[derive(Clone)]
pub struct HealthCheckService {
    /// Reminder store.
    reminders: Arc<dyn ReminderStore>,
    /// Delivery audit store.
    deliveries: Arc<dyn DeliveryStore>,
    /// Dispatcher for the immediate re-dispatch pass.
    dispatcher: Arc<DeliveryDispatcher>,
    /// Channel configuration audited for missing credentials.
    channels: ChannelsConfig,
    /// Retry/backoff policy.
    delivery_config: DeliveryConfig,
    /// Maximum reminders re-dispatched per run.
    batch_size: i64,
}

impl HealthCheckService {
    /// Creates a new health check service.
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        deliveries: Arc<dyn DeliveryStore>,
        dispatcher: Arc<DeliveryDispatcher>,
        channels: ChannelsConfig,
        delivery_config: DeliveryConfig,
        batch_size: i64,
    ) -> Self {
        Self {
            reminders,
            deliveries,
            dispatcher,
            channels,
            delivery_config,
            batch_size,
        }
    }

    /// Run one health/reconciliation pass.
    pub async fn run(&self) -> AppResult<HealthReport> {
        let now = Utc::now();
        let window_start = now - Duration::hours(24);

        let sent_count = self
            .deliveries
            .count_since(DeliveryStatus::Sent, window_start)
            .await?;
        let failed_count = self
            .deliveries
            .count_since(DeliveryStatus::Failed, window_start)
            .await?;

        let total = sent_count + failed_count;
        let success_rate = (total > 0).then(|| sent_count as f64 / total as f64);
        let below_threshold =
            success_rate.is_some_and(|rate| rate < self.delivery_config.success_rate_threshold);

        if below_threshold {
            warn!(
                sent = sent_count,
                failed = failed_count,
                rate = success_rate.unwrap_or(0.0),
                threshold = self.delivery_config.success_rate_threshold,
                "Delivery success rate below threshold"
            );
        }

        let stale_cutoff = now - Duration::minutes(self.delivery_config.stale_claim_minutes);
        let released_stale = self.reminders.release_stale_sending(stale_cutoff).await?;
        if released_stale > 0 {
            warn!(released_stale, "Released abandoned in-flight reminders");
        }

        let requeued = self
            .reminders
            .requeue_failed(now, self.delivery_config.retry_ceiling)
            .await?;

        let redispatched = if requeued > 0 || released_stale > 0 {
            self.redispatch_due().await?
        } else {
            0
        };

        let config_warnings = audit_channels(&self.channels);
        for warning in &config_warnings {
            warn!(warning = %warning, "Channel configuration incomplete");
        }

        let report = HealthReport {
            checked_at: now,
            sent_count,
            failed_count,
            success_rate,
            below_threshold,
            released_stale,
            requeued,
            redispatched,
            config_warnings,
        };

        info!(
            sent = report.sent_count,
            failed = report.failed_count,
            requeued = report.requeued,
            redispatched = report.redispatched,
            "Health check complete"
        );
        Ok(report)
    }

    /// Push requeued reminders straight back through the dispatcher rather
    /// than waiting for the next delivery sweep.
    async fn redispatch_due(&self) -> AppResult<u64> {
        let due = self.reminders.find_due(Utc::now(), self.batch_size).await?;
        let mut delivered = 0u64;

        for reminder in due {
            match self.dispatcher.deliver(reminder.id).await {
                Ok(DispatchOutcome::Sent(_)) => delivered += 1,
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        reminder_id = %reminder.id,
                        error = %e,
                        "Dispatch error during retry sweep, continuing"
                    );
                }
            }
        }

        Ok(delivered)
    }
}

/// Collect missing-credential warnings for every enabled channel.
///
/// A disabled SMS channel is not a warning; partial channel availability
/// is tolerated and handled by the dispatcher's fallback policy.
fn audit_channels(channels: &ChannelsConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if channels.line.channel_access_token.is_empty() {
        warnings.push("LINE channel access token is not configured".to_string());
    }
    if channels.email.smtp_host.is_empty() || channels.email.from_address.is_empty() {
        warnings.push("Email SMTP relay or from-address is not configured".to_string());
    }
    if channels.sms.enabled
        && (channels.sms.account_sid.is_empty()
            || channels.sms.auth_token.is_empty()
            || channels.sms.from_number.is_empty()
            || channels.sms.api_url.is_empty())
    {
        warnings.push("SMS is enabled but gateway credentials are incomplete".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use careminder_core::config::channels::{EmailConfig, LineConfig, SmsConfig};

    fn full_config() -> ChannelsConfig {
        ChannelsConfig {
            line: LineConfig {
                channel_access_token: "token".to_string(),
                ..LineConfig::default()
            },
            email: EmailConfig {
                smtp_host: "smtp.example.com".to_string(),
                from_address: "clinic@example.com".to_string(),
                ..EmailConfig::default()
            },
            sms: SmsConfig::default(),
        }
    }

    #[test]
    fn complete_config_yields_no_warnings() {
        assert!(audit_channels(&full_config()).is_empty());
    }

    #[test]
    fn missing_line_token_warns() {
        let mut config = full_config();
        config.line.channel_access_token.clear();
        let warnings = audit_channels(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("LINE"));
    }

    #[test]
    fn disabled_sms_does_not_warn() {
        let config = full_config();
        assert!(!config.sms.enabled);
        assert!(audit_channels(&config).is_empty());
    }

    #[test]
    fn enabled_sms_without_credentials_warns() {
        let mut config = full_config();
        config.sms.enabled = true;
        let warnings = audit_channels(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("SMS"));
    }
}
