//! Appointment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::AppointmentStatus;

/// A booked patient appointment.
///
/// Owned by the booking subsystem; the reminder core reads appointments
/// but never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    /// Unique appointment identifier.
    pub id: Uuid,
    /// The patient this appointment belongs to.
    pub patient_id: Uuid,
    /// When the appointment takes place.
    pub scheduled_at: DateTime<Utc>,
    /// Current appointment status.
    pub status: AppointmentStatus,
    /// Treatment type label (e.g., `"checkup"`, `"root_canal"`).
    pub treatment_type: Option<String>,
    /// When the appointment was created.
    pub created_at: DateTime<Utc>,
    /// When the appointment was last updated.
    pub updated_at: DateTime<Utc>,
}
