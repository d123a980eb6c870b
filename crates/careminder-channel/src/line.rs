//! LINE Messaging API sender.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use careminder_core::config::channels::LineConfig;
use careminder_core::error::{AppError, ErrorKind};
use careminder_core::result::AppResult;
use careminder_entity::delivery::DeliveryChannel;

use crate::sender::ChannelSender;

/// Sends push messages through the LINE Messaging API.
///
/// Invalid tokens, rate limits, and blocked recipients all surface as
/// generic external-service failures; the dispatcher's retry ceiling is
/// the only escalation path.
#[derive(Debug, Clone)]
pub struct LineSender {
    config: LineConfig,
    client: reqwest::Client,
}

impl LineSender {
    /// Create a new LINE sender with the given request timeout.
    pub fn new(config: LineConfig, timeout: Duration) -> AppResult<Self> {
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
impl ChannelSender for LineSender {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Line
    }

    fn is_configured(&self) -> bool {
        !self.config.channel_access_token.is_empty()
    }

    async fn send(&self, recipient: &str, subject: &str, content: &str) -> AppResult<()> {
        if !self.is_configured() {
            return Err(AppError::configuration("LINE channel access token not set"));
        }

        // LINE messages carry no subject line; fold it into the text body.
        let text = if subject.is_empty() {
            content.to_string()
        } else {
            format!("{subject}\n\n{content}")
        };

        let body = serde_json::json!({
            "to": recipient,
            "messages": [{ "type": "text", "text": text }],
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.channel_access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("LINE push request failed: {e}"),
                    e,
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "LINE push rejected: {status} {detail}"
            )));
        }

        debug!(recipient = %recipient, "LINE push message accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sender_for(server: &MockServer) -> LineSender {
        LineSender::new(
            LineConfig {
                channel_access_token: "test-token".to_string(),
                api_url: format!("{}/v2/bot/message/push", server.uri()),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn send_posts_push_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/push"))
            .and(bearer_token("test-token"))
            .and(body_partial_json(serde_json::json!({"to": "U1234"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sender = sender_for(&server);
        sender
            .send("U1234", "Reminder", "See you tomorrow")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn send_maps_rejection_to_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let sender = sender_for(&server);
        let err = sender.send("U1234", "Reminder", "body").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }

    #[tokio::test]
    async fn unconfigured_sender_reports_configuration_error() {
        let sender =
            LineSender::new(LineConfig::default(), Duration::from_secs(5)).unwrap();
        assert!(!sender.is_configured());
        let err = sender.send("U1234", "s", "c").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
