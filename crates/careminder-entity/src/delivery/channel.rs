//! Delivery channel enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A communication medium for patient messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    /// LINE Messaging API push message.
    Line,
    /// SMTP email.
    Email,
    /// SMS text message.
    Sms,
}

impl DeliveryChannel {
    /// Fixed fallback order tried when the patient has no usable
    /// preferred channel.
    pub const FALLBACK_ORDER: [DeliveryChannel; 3] = [Self::Line, Self::Email, Self::Sms];

    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
