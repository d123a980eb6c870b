//! Appointment lifecycle hooks — the inbound surface for the booking layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use careminder_core::result::AppResult;
use careminder_entity::appointment::Appointment;
use careminder_entity::reminder::Reminder;

use crate::schedule::ReminderScheduler;

/// Entry points the booking subsystem calls when appointments change.
///
/// Cancellation cascades run synchronously inside the hook so a daily
/// sweep starting moments later cannot pick up reminders for an
/// appointment that was just cancelled.
#[derive(Clone)]
pub struct AppointmentLifecycle {
    /// Reminder scheduler.
    scheduler: Arc<ReminderScheduler>,
}

impl AppointmentLifecycle {
    /// Creates a new lifecycle hook handler.
    pub fn new(scheduler: Arc<ReminderScheduler>) -> Self {
        Self { scheduler }
    }

    /// A new appointment was booked: materialize its reminder sequence.
    pub async fn on_appointment_created(
        &self,
        appointment: &Appointment,
    ) -> AppResult<Vec<Reminder>> {
        self.scheduler.schedule_for_appointment(appointment).await
    }

    /// An appointment was updated. Only a date change touches reminders:
    /// the pending set is cancelled and a fresh set scheduled for the new
    /// date.
    pub async fn on_appointment_updated(
        &self,
        appointment: &Appointment,
        previous_scheduled_at: DateTime<Utc>,
    ) -> AppResult<Vec<Reminder>> {
        if appointment.scheduled_at == previous_scheduled_at {
            debug!(
                appointment_id = %appointment.id,
                "Appointment updated without a date change, reminders untouched"
            );
            return Ok(Vec::new());
        }

        info!(
            appointment_id = %appointment.id,
            previous = %previous_scheduled_at,
            new = %appointment.scheduled_at,
            "Appointment rescheduled, rebuilding reminders"
        );
        self.scheduler.reschedule_appointment(appointment).await
    }

    /// An appointment was cancelled: cancel its pending reminders in place.
    pub async fn on_appointment_cancelled(&self, appointment_id: Uuid) -> AppResult<u64> {
        self.scheduler.cancel_for_appointment(appointment_id).await
    }
}
