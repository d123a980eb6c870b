//! Reminder scheduler service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use careminder_core::error::AppError;
use careminder_core::result::AppResult;
use careminder_database::store::ReminderStore;
use careminder_entity::appointment::Appointment;
use careminder_entity::reminder::{Reminder, ReminderKind, ReminderStatus};

use super::candidates::candidate_times;

/// Materializes, cancels, and reschedules the reminder rows of an
/// appointment.
#[derive(Clone)]
pub struct ReminderScheduler {
    /// Reminder store.
    reminders: Arc<dyn ReminderStore>,
}

impl ReminderScheduler {
    /// Creates a new reminder scheduler.
    pub fn new(reminders: Arc<dyn ReminderStore>) -> Self {
        Self { reminders }
    }

    /// Materializes the reminder sequence for an appointment.
    ///
    /// Idempotent: candidates whose `(appointment, kind)` pair already has
    /// a non-cancelled row are skipped, as are candidates whose time has
    /// already passed. Returns only the reminders created by this call.
    pub async fn schedule_for_appointment(
        &self,
        appointment: &Appointment,
    ) -> AppResult<Vec<Reminder>> {
        if !appointment.status.accepts_reminders() {
            warn!(
                appointment_id = %appointment.id,
                status = %appointment.status,
                "Skipping reminder scheduling for inactive appointment"
            );
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut created = Vec::new();

        for (kind, scheduled_at) in candidate_times(appointment.scheduled_at) {
            if scheduled_at <= now {
                debug!(
                    appointment_id = %appointment.id,
                    kind = %kind,
                    scheduled_at = %scheduled_at,
                    "Skipping past-dated reminder candidate"
                );
                continue;
            }

            if self.reminders.exists_for_kind(appointment.id, kind).await? {
                debug!(
                    appointment_id = %appointment.id,
                    kind = %kind,
                    "Reminder already exists, skipping"
                );
                continue;
            }

            let reminder = build_pending(appointment.id, kind, scheduled_at, None);
            self.reminders.insert(&reminder).await?;

            info!(
                appointment_id = %appointment.id,
                reminder_id = %reminder.id,
                kind = %kind,
                scheduled_at = %scheduled_at,
                "Scheduled reminder"
            );
            created.push(reminder);
        }

        Ok(created)
    }

    /// Creates an ad-hoc manual reminder with caller-supplied content.
    ///
    /// Manual reminders are exempt from the one-per-kind uniqueness rule
    /// but still require an active appointment and a future delivery time.
    pub async fn schedule_manual(
        &self,
        appointment: &Appointment,
        content: &str,
        scheduled_at: DateTime<Utc>,
    ) -> AppResult<Reminder> {
        if !appointment.status.accepts_reminders() {
            return Err(AppError::validation(format!(
                "Cannot add a manual reminder to a {} appointment",
                appointment.status
            )));
        }
        if content.is_empty() {
            return Err(AppError::validation("Manual reminder content is empty"));
        }
        if scheduled_at <= Utc::now() {
            return Err(AppError::validation(
                "Manual reminder time must be in the future",
            ));
        }

        let reminder = build_pending(
            appointment.id,
            ReminderKind::Manual,
            scheduled_at,
            Some(content.to_string()),
        );
        self.reminders.insert(&reminder).await?;

        info!(
            appointment_id = %appointment.id,
            reminder_id = %reminder.id,
            scheduled_at = %scheduled_at,
            "Scheduled manual reminder"
        );
        Ok(reminder)
    }

    /// Cancels every pending reminder of an appointment in place.
    pub async fn cancel_for_appointment(&self, appointment_id: Uuid) -> AppResult<u64> {
        let cancelled = self
            .reminders
            .cancel_pending_for_appointment(appointment_id)
            .await?;

        if cancelled > 0 {
            info!(
                appointment_id = %appointment_id,
                cancelled,
                "Cancelled pending reminders"
            );
        }
        Ok(cancelled)
    }

    /// Replaces the reminder sequence after a date change: cancel what is
    /// pending, then schedule a fresh set for the new date.
    pub async fn reschedule_appointment(
        &self,
        appointment: &Appointment,
    ) -> AppResult<Vec<Reminder>> {
        self.cancel_for_appointment(appointment.id).await?;
        self.schedule_for_appointment(appointment).await
    }
}

/// Build a pending reminder row.
fn build_pending(
    appointment_id: Uuid,
    kind: ReminderKind,
    scheduled_at: DateTime<Utc>,
    message_content: Option<String>,
) -> Reminder {
    let now = Utc::now();
    Reminder {
        id: Uuid::new_v4(),
        appointment_id,
        kind,
        scheduled_at,
        status: ReminderStatus::Pending,
        retry_count: 0,
        next_retry_at: None,
        error_message: None,
        message_content,
        sent_at: None,
        created_at: now,
        updated_at: now,
    }
}
