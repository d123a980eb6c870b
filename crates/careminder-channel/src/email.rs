//! SMTP email sender.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use careminder_core::config::channels::EmailConfig;
use careminder_core::error::{AppError, ErrorKind};
use careminder_core::result::AppResult;
use careminder_entity::delivery::DeliveryChannel;

use crate::sender::ChannelSender;

/// Sends plain-text email over an SMTP relay.
#[derive(Clone)]
pub struct EmailSender {
    config: EmailConfig,
    /// Built only when an SMTP host is configured.
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSender")
            .field("smtp_host", &self.config.smtp_host)
            .field("from_address", &self.config.from_address)
            .finish()
    }
}

impl EmailSender {
    /// Create a new email sender with the given send timeout.
    pub fn new(config: EmailConfig, timeout: Duration) -> AppResult<Self> {
        let transport = if config.smtp_host.is_empty() {
            None
        } else {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
                &config.smtp_host,
            )
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid SMTP relay '{}': {e}", config.smtp_host),
                    e,
                )
            })?
            .port(config.smtp_port)
            .timeout(Some(timeout));

            if !config.smtp_username.is_empty() {
                builder = builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ));
            }

            Some(builder.build())
        };

        Ok(Self { config, transport })
    }
}

#[async_trait]
impl ChannelSender for EmailSender {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Email
    }

    fn is_configured(&self) -> bool {
        self.transport.is_some() && !self.config.from_address.is_empty()
    }

    async fn send(&self, recipient: &str, subject: &str, content: &str) -> AppResult<()> {
        let Some(transport) = &self.transport else {
            return Err(AppError::configuration("SMTP relay not configured"));
        };

        let from: Mailbox = self.config.from_address.parse().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid from address '{}'", self.config.from_address),
                e,
            )
        })?;
        let to: Mailbox = recipient.parse().map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("Invalid recipient address '{recipient}'"),
                e,
            )
        })?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .body(content.to_string())
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build email message", e)
            })?;

        transport.send(message).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("SMTP send failed: {e}"),
                e,
            )
        })?;

        debug!(recipient = %recipient, "Email accepted by SMTP relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_sender_reports_configuration_error() {
        let sender =
            EmailSender::new(EmailConfig::default(), Duration::from_secs(5)).unwrap();
        assert!(!sender.is_configured());
        let err = sender
            .send("p@example.com", "s", "c")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn invalid_recipient_is_a_validation_error() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            from_address: "clinic@example.com".to_string(),
            ..EmailConfig::default()
        };
        let sender = EmailSender::new(config, Duration::from_secs(5)).unwrap();
        let err = sender.send("not-an-address", "s", "c").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
