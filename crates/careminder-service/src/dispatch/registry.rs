//! Sender registry — the dispatcher's view of the available channels.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use careminder_channel::sender::ChannelSender;
use careminder_entity::delivery::DeliveryChannel;

/// Holds one sender per channel, keyed by the channel it transmits over.
#[derive(Clone, Default)]
pub struct SenderRegistry {
    senders: HashMap<DeliveryChannel, Arc<dyn ChannelSender>>,
}

impl SenderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender. A later registration for the same channel
    /// replaces the earlier one.
    pub fn register(&mut self, sender: Arc<dyn ChannelSender>) {
        let channel = sender.channel();
        info!(channel = %channel, configured = sender.is_configured(), "Registered channel sender");
        self.senders.insert(channel, sender);
    }

    /// Get the sender for a channel.
    pub fn get(&self, channel: DeliveryChannel) -> Option<&Arc<dyn ChannelSender>> {
        self.senders.get(&channel)
    }

    /// Channels that are registered and fully configured, in fallback order.
    pub fn usable_channels(&self) -> Vec<DeliveryChannel> {
        DeliveryChannel::FALLBACK_ORDER
            .into_iter()
            .filter(|ch| self.senders.get(ch).is_some_and(|s| s.is_configured()))
            .collect()
    }
}
