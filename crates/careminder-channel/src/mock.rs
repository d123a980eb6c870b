//! Mock channel sender for deterministic testing.
//!
//! `MockSender` implements [`ChannelSender`] with scriptable failures and
//! captured outbound messages for assertion in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use careminder_core::error::AppError;
use careminder_core::result::AppResult;
use careminder_entity::delivery::DeliveryChannel;

use crate::sender::ChannelSender;

/// One message captured by a [`MockSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient identifier the message was addressed to.
    pub recipient: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub content: String,
}

/// A mock sender that records sends and fails on demand.
#[derive(Debug, Clone)]
pub struct MockSender {
    channel: DeliveryChannel,
    configured: bool,
    failures_remaining: Arc<Mutex<u32>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl MockSender {
    /// Create a configured mock sender for `channel`.
    pub fn new(channel: DeliveryChannel) -> Self {
        Self {
            channel,
            configured: true,
            failures_remaining: Arc::new(Mutex::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a sender that reports itself as unconfigured.
    pub fn unconfigured(channel: DeliveryChannel) -> Self {
        Self {
            configured: false,
            ..Self::new(channel)
        }
    }

    /// Make the next `n` sends fail with an external-service error.
    pub async fn fail_next(&self, n: u32) {
        *self.failures_remaining.lock().await = n;
    }

    /// Get all messages that were sent through this sender.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl ChannelSender for MockSender {
    fn channel(&self) -> DeliveryChannel {
        self.channel
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, recipient: &str, subject: &str, content: &str) -> AppResult<()> {
        {
            let mut failures = self.failures_remaining.lock().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(AppError::external_service("simulated channel failure"));
            }
        }

        self.sent.lock().await.push(SentMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}
