//! Delivery entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::channel::DeliveryChannel;
use super::status::DeliveryStatus;
use crate::reminder::kind::ReminderKind;

/// Audit record of one concrete attempt to transmit a message.
///
/// One row is inserted per dispatch attempt and updated exactly once with
/// the attempt's outcome. Rows are never deleted; they are the audit trail
/// behind the health check's success-rate metric.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Delivery {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// The patient the message was addressed to.
    pub patient_id: Uuid,
    /// The appointment the message concerns, if any.
    pub appointment_id: Option<Uuid>,
    /// The reminder this attempt was made for, if any.
    pub reminder_id: Option<Uuid>,
    /// Channel the message was sent over.
    pub channel: DeliveryChannel,
    /// Reminder kind, denormalized for reporting.
    pub kind: ReminderKind,
    /// Attempt outcome.
    pub status: DeliveryStatus,
    /// Message subject.
    pub subject: String,
    /// Message body as transmitted.
    pub content: String,
    /// When the channel accepted the message.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the recipient opened the message.
    pub opened_at: Option<DateTime<Utc>>,
    /// When the recipient read the message.
    pub read_at: Option<DateTime<Utc>>,
    /// Error message if the attempt failed.
    pub error_message: Option<String>,
    /// Which attempt number this row records (0 = first try).
    pub retry_count: i32,
    /// When the delivery row was created.
    pub created_at: DateTime<Utc>,
    /// When the delivery row was last updated.
    pub updated_at: DateTime<Utc>,
}
