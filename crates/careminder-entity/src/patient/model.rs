//! Patient entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::delivery::channel::DeliveryChannel;

/// A registered patient.
///
/// The reminder core uses patients only to resolve a delivery channel and
/// to greet the patient in rendered messages.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    /// Unique patient identifier.
    pub id: Uuid,
    /// Patient display name.
    pub name: String,
    /// LINE user identifier, if the patient linked their account.
    pub line_user_id: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number in E.164 format.
    pub phone: Option<String>,
    /// Channel the patient asked to be contacted on.
    pub preferred_contact_method: Option<DeliveryChannel>,
    /// When the patient record was created.
    pub created_at: DateTime<Utc>,
    /// When the patient record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Return the contact identifier for a channel, if present and non-empty.
    pub fn contact_for(&self, channel: DeliveryChannel) -> Option<&str> {
        let value = match channel {
            DeliveryChannel::Line => self.line_user_id.as_deref(),
            DeliveryChannel::Email => self.email.as_deref(),
            DeliveryChannel::Sms => self.phone.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(line: Option<&str>, email: Option<&str>, phone: Option<&str>) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: "Sato Hanako".to_string(),
            line_user_id: line.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
            preferred_contact_method: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn contact_for_returns_non_empty_fields_only() {
        let p = patient(Some(""), Some("hanako@example.com"), None);
        assert_eq!(p.contact_for(DeliveryChannel::Line), None);
        assert_eq!(
            p.contact_for(DeliveryChannel::Email),
            Some("hanako@example.com")
        );
        assert_eq!(p.contact_for(DeliveryChannel::Sms), None);
    }
}
