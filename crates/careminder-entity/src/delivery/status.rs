//! Delivery attempt status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one concrete send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Created; the channel call has not completed yet.
    Pending,
    /// Accepted by the channel.
    Sent,
    /// Rejected by the channel or the transport.
    Failed,
    /// The recipient opened the message (channel callback).
    Opened,
    /// The recipient read the message (channel callback).
    Read,
}

impl DeliveryStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Opened => "opened",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
