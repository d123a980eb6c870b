//! Reminder delivery-status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery status of a scheduled reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    /// Waiting for its scheduled time.
    Pending,
    /// Claimed by a dispatcher; a send is in flight.
    Sending,
    /// Handed to the channel successfully.
    Sent,
    /// Confirmed delivered by the channel.
    Delivered,
    /// The last send attempt failed.
    Failed,
    /// The channel reported the recipient unreachable.
    Bounced,
    /// Cancelled together with its appointment.
    Cancelled,
}

impl ReminderStatus {
    /// Check if the reminder is in a state no sweep will touch again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Delivered | Self::Bounced | Self::Cancelled)
    }

    /// Check if a dispatcher may claim the reminder.
    pub fn can_dispatch(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Bounced => "bounced",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
