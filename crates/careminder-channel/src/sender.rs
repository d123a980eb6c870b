//! The channel sender trait.

use async_trait::async_trait;

use careminder_core::result::AppResult;
use careminder_entity::delivery::DeliveryChannel;

/// One communication medium capable of delivering a message to a patient.
///
/// Implementations perform a single synchronous send and report the
/// outcome; they do not retry, queue, or record anything. The dispatcher
/// owns all retry policy and persistence.
#[async_trait]
pub trait ChannelSender: Send + Sync + 'static {
    /// The channel this sender transmits over.
    fn channel(&self) -> DeliveryChannel;

    /// Whether the credentials required by this channel are present.
    ///
    /// An unconfigured sender is silently skipped by the dispatcher's
    /// fallback policy and reported by the health check's config audit.
    fn is_configured(&self) -> bool;

    /// Transmit one message to `recipient`.
    ///
    /// The recipient identifier is channel-specific: a LINE user ID, an
    /// email address, or an E.164 phone number.
    async fn send(&self, recipient: &str, subject: &str, content: &str) -> AppResult<()>;
}
