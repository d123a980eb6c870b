//! Reminder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::ReminderKind;
use super::status::ReminderStatus;

/// A scheduled intent to notify a patient about an upcoming appointment.
///
/// Rows are created by the scheduler, claimed and transitioned by the
/// dispatcher, and requeued by the health check. They are cancelled in
/// place when their appointment is cancelled, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    /// Unique reminder identifier.
    pub id: Uuid,
    /// The appointment this reminder belongs to.
    pub appointment_id: Uuid,
    /// Which reminder of the sequence this is.
    pub kind: ReminderKind,
    /// When delivery should be attempted.
    pub scheduled_at: DateTime<Utc>,
    /// Current delivery status.
    pub status: ReminderStatus,
    /// Number of failed delivery attempts so far.
    pub retry_count: i32,
    /// Earliest time the next automatic retry may run.
    pub next_retry_at: Option<DateTime<Utc>>,
    /// Error message from the last failed attempt.
    pub error_message: Option<String>,
    /// Caller-supplied body for manual reminders.
    pub message_content: Option<String>,
    /// When the reminder was successfully handed to a channel.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the reminder was created.
    pub created_at: DateTime<Utc>,
    /// When the reminder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    /// Check if the reminder is due for delivery at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status.can_dispatch() && self.scheduled_at <= now
    }
}
