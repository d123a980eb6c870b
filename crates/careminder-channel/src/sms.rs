//! SMS gateway sender (Twilio-compatible REST API).

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use careminder_core::config::channels::SmsConfig;
use careminder_core::error::{AppError, ErrorKind};
use careminder_core::result::AppResult;
use careminder_entity::delivery::DeliveryChannel;

use crate::sender::ChannelSender;

/// Maximum characters transmitted in one SMS body.
pub const SMS_MAX_CHARS: usize = 160;

/// Hard-truncate an SMS body to [`SMS_MAX_CHARS`] characters.
///
/// Counts characters rather than bytes so multi-byte text is cut cleanly.
pub fn truncate_sms(content: &str) -> String {
    content.chars().take(SMS_MAX_CHARS).collect()
}

/// Sends text messages through a Twilio-compatible Messages endpoint.
#[derive(Debug, Clone)]
pub struct SmsSender {
    config: SmsConfig,
    client: reqwest::Client,
}

impl SmsSender {
    /// Create a new SMS sender with the given request timeout.
    pub fn new(config: SmsConfig, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChannelSender for SmsSender {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Sms
    }

    fn is_configured(&self) -> bool {
        self.config.enabled
            && !self.config.account_sid.is_empty()
            && !self.config.auth_token.is_empty()
            && !self.config.from_number.is_empty()
            && !self.config.api_url.is_empty()
    }

    async fn send(&self, recipient: &str, _subject: &str, content: &str) -> AppResult<()> {
        if !self.is_configured() {
            return Err(AppError::configuration("SMS gateway not configured"));
        }

        // SMS carries no subject; the body is hard-truncated, never rejected.
        let body = truncate_sms(content);

        let response = self
            .client
            .post(&self.config.api_url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", recipient),
                ("From", self.config.from_number.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("SMS request failed: {e}"),
                    e,
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "SMS gateway rejected: {status} {detail}"
            )));
        }

        debug!(recipient = %recipient, chars = body.chars().count(), "SMS accepted by gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn truncate_cuts_at_160_chars() {
        let long = "a".repeat(300);
        let truncated = truncate_sms(&long);
        assert_eq!(truncated.chars().count(), 160);
    }

    #[test]
    fn truncate_leaves_short_content_alone() {
        assert_eq!(truncate_sms("short message"), "short message");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let long = "予".repeat(300);
        let truncated = truncate_sms(&long);
        assert_eq!(truncated.chars().count(), 160);
    }

    fn configured(server: &MockServer) -> SmsSender {
        SmsSender::new(
            SmsConfig {
                enabled: true,
                account_sid: "AC123".to_string(),
                auth_token: "secret".to_string(),
                from_number: "+815000000000".to_string(),
                api_url: format!("{}/2010-04-01/Messages.json", server.uri()),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn send_truncates_transmitted_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Messages.json"))
            .and(body_string_contains("To=%2B819000000000"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let sender = configured(&server);
        let long = "b".repeat(300);
        sender.send("+819000000000", "", &long).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body).to_string();
        // 160 'b' characters, then the next form field.
        assert!(body.contains(&"b".repeat(160)));
        assert!(!body.contains(&"b".repeat(161)));
    }

    #[tokio::test]
    async fn disabled_sender_is_unconfigured() {
        let sender = SmsSender::new(SmsConfig::default(), Duration::from_secs(5)).unwrap();
        assert!(!sender.is_configured());
        let err = sender.send("+81", "", "hi").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
