//! Appointment status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a patient appointment.
///
/// The reminder core never transitions this status itself; it only reads
/// it to decide whether reminders may be scheduled or delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked and not yet visited.
    Booked,
    /// The patient has checked in.
    Visited,
    /// Treatment finished.
    Completed,
    /// Cancelled by the patient or the clinic.
    Cancelled,
    /// The patient did not show up.
    NoShow,
}

impl AppointmentStatus {
    /// Check whether reminders may be scheduled for this appointment.
    pub fn accepts_reminders(&self) -> bool {
        matches!(self, Self::Booked | Self::Visited)
    }

    /// Check whether reminder delivery is blocked for this appointment.
    pub fn blocks_delivery(&self) -> bool {
        matches!(self, Self::Cancelled | Self::NoShow)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Visited => "visited",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
