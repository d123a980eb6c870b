//! Reminder kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which reminder of an appointment's sequence this row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// One week before the appointment.
    SevenDays,
    /// Three days before the appointment.
    ThreeDays,
    /// The morning of the appointment day.
    OneDay,
    /// Ad-hoc reminder with caller-supplied content.
    Manual,
}

impl ReminderKind {
    /// Check whether this is an ad-hoc manual reminder.
    ///
    /// Manual reminders are exempt from the one-per-appointment uniqueness
    /// rule that applies to the scheduled kinds.
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual)
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenDays => "seven_days",
            Self::ThreeDays => "three_days",
            Self::OneDay => "one_day",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
