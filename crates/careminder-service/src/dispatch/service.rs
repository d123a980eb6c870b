//! Delivery dispatcher service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use careminder_core::config::clinic::ClinicConfig;
use careminder_core::config::delivery::DeliveryConfig;
use careminder_core::error::AppError;
use careminder_core::result::AppResult;
use careminder_channel::sms::truncate_sms;
use careminder_database::store::{
    AppointmentStore, DeliveryStore, PatientStore, ReminderStore,
};
use careminder_entity::delivery::{Delivery, DeliveryChannel, DeliveryStatus};
use careminder_entity::reminder::Reminder;

use super::backoff::BackoffSchedule;
use super::registry::SenderRegistry;
use super::selection::select_channel;
use crate::templates;

/// Why a dispatch attempt ended without a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The reminder was not pending — another dispatcher already claimed
    /// it, or it reached a terminal state.
    NotClaimable,
    /// The appointment was cancelled or marked no-show after scheduling.
    AppointmentInactive,
}

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message was handed to the channel.
    Sent(DeliveryChannel),
    /// A precondition failed; nothing was attempted (not an error).
    Skipped(SkipReason),
    /// No channel had both credentials and a contact identifier.
    NoContactableChannel,
    /// The chosen channel rejected the message; retry bookkeeping updated.
    Failed {
        /// Channel that was attempted.
        channel: DeliveryChannel,
        /// Error detail recorded on the reminder and delivery rows.
        error: String,
    },
}

/// Turns a due reminder into one channel send attempt and records the
/// outcome.
///
/// All send failures are converted into persisted state; `deliver` only
/// returns `Err` for store failures and data-invariant violations, so a
/// sweep over many reminders survives individual channel outages.
#[derive(Clone)]
pub struct DeliveryDispatcher {
    /// Reminder store.
    reminders: Arc<dyn ReminderStore>,
    /// Delivery audit store.
    deliveries: Arc<dyn DeliveryStore>,
    /// Appointment store (read-only).
    appointments: Arc<dyn AppointmentStore>,
    /// Patient store (read-only).
    patients: Arc<dyn PatientStore>,
    /// Channel senders keyed by channel.
    registry: Arc<SenderRegistry>,
    /// Clinic identity for template rendering.
    clinic: ClinicConfig,
    /// Retry backoff table.
    backoff: BackoffSchedule,
    /// Timeout applied to each sender call.
    send_timeout: Duration,
}

impl DeliveryDispatcher {
    /// Creates a new delivery dispatcher.
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        deliveries: Arc<dyn DeliveryStore>,
        appointments: Arc<dyn AppointmentStore>,
        patients: Arc<dyn PatientStore>,
        registry: Arc<SenderRegistry>,
        clinic: ClinicConfig,
        delivery: &DeliveryConfig,
    ) -> Self {
        Self {
            reminders,
            deliveries,
            appointments,
            patients,
            registry,
            clinic,
            backoff: BackoffSchedule::new(delivery.backoff_minutes.clone()),
            send_timeout: Duration::from_secs(delivery.send_timeout_seconds),
        }
    }

    /// Attempt delivery of one reminder.
    pub async fn deliver(&self, reminder_id: Uuid) -> AppResult<DispatchOutcome> {
        // Claiming first makes the double-send guard unconditional: the
        // loser of a concurrent race observes a non-pending row here.
        let Some(reminder) = self.reminders.claim_for_dispatch(reminder_id).await? else {
            debug!(reminder_id = %reminder_id, "Reminder not claimable, skipping");
            return Ok(DispatchOutcome::Skipped(SkipReason::NotClaimable));
        };

        let Some(appointment) = self
            .appointments
            .find_by_id(reminder.appointment_id)
            .await?
        else {
            error!(
                reminder_id = %reminder.id,
                appointment_id = %reminder.appointment_id,
                "Reminder references a missing appointment"
            );
            self.reminders
                .mark_failed(reminder.id, "appointment record missing", reminder.retry_count, None)
                .await?;
            return Err(AppError::internal(format!(
                "Appointment {} missing for reminder {}",
                reminder.appointment_id, reminder.id
            )));
        };

        // Re-checked after the claim: a reschedule-then-dispatch race ends
        // here as a no-op rather than a stray send.
        if appointment.status.blocks_delivery() {
            info!(
                reminder_id = %reminder.id,
                appointment_id = %appointment.id,
                status = %appointment.status,
                "Appointment no longer active, cancelling reminder"
            );
            self.reminders.mark_cancelled(reminder.id).await?;
            return Ok(DispatchOutcome::Skipped(SkipReason::AppointmentInactive));
        }

        let Some(patient) = self.patients.find_by_id(appointment.patient_id).await? else {
            error!(
                reminder_id = %reminder.id,
                patient_id = %appointment.patient_id,
                "Reminder references a missing patient"
            );
            self.reminders
                .mark_failed(reminder.id, "patient record missing", reminder.retry_count, None)
                .await?;
            return Err(AppError::internal(format!(
                "Patient {} missing for reminder {}",
                appointment.patient_id, reminder.id
            )));
        };

        let usable = self.registry.usable_channels();
        let Some(channel) = select_channel(&patient, &usable) else {
            warn!(
                reminder_id = %reminder.id,
                patient_id = %patient.id,
                "No contactable channel for patient"
            );
            self.reminders
                .mark_failed(reminder.id, "no contactable channel", reminder.retry_count, None)
                .await?;
            return Ok(DispatchOutcome::NoContactableChannel);
        };
        let Some(recipient) = patient.contact_for(channel).map(String::from) else {
            // select_channel only returns channels with a contact on file.
            return Err(AppError::internal(format!(
                "Selected channel {channel} has no contact for patient {}",
                patient.id
            )));
        };

        let message = templates::render(&reminder, &appointment, &patient, &self.clinic);
        let content = match channel {
            DeliveryChannel::Sms => truncate_sms(&message.sms_body),
            _ => message.body.clone(),
        };

        let now = Utc::now();
        let delivery = Delivery {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            appointment_id: Some(appointment.id),
            reminder_id: Some(reminder.id),
            channel,
            kind: reminder.kind,
            status: DeliveryStatus::Pending,
            subject: message.subject.clone(),
            content: content.clone(),
            sent_at: None,
            opened_at: None,
            read_at: None,
            error_message: None,
            retry_count: reminder.retry_count,
            created_at: now,
            updated_at: now,
        };
        self.deliveries.insert(&delivery).await?;

        let send_result = self
            .send_with_timeout(channel, &recipient, &message.subject, &content)
            .await;

        match send_result {
            Ok(()) => {
                let sent_at = Utc::now();
                self.deliveries.mark_sent(delivery.id, sent_at).await?;
                self.reminders.mark_sent(reminder.id, sent_at).await?;
                info!(
                    reminder_id = %reminder.id,
                    delivery_id = %delivery.id,
                    channel = %channel,
                    "Reminder delivered"
                );
                Ok(DispatchOutcome::Sent(channel))
            }
            Err(e) => {
                let detail = e.to_string();
                self.deliveries.mark_failed(delivery.id, &detail).await?;
                self.record_send_failure(&reminder, &detail).await?;
                warn!(
                    reminder_id = %reminder.id,
                    delivery_id = %delivery.id,
                    channel = %channel,
                    error = %detail,
                    retry_count = reminder.retry_count + 1,
                    "Reminder delivery failed"
                );
                Ok(DispatchOutcome::Failed {
                    channel,
                    error: detail,
                })
            }
        }
    }

    /// Invoke the sender for `channel`, converting timeouts into failures.
    async fn send_with_timeout(
        &self,
        channel: DeliveryChannel,
        recipient: &str,
        subject: &str,
        content: &str,
    ) -> AppResult<()> {
        let Some(sender) = self.registry.get(channel) else {
            return Err(AppError::configuration(format!(
                "No sender registered for channel {channel}"
            )));
        };

        match tokio::time::timeout(self.send_timeout, sender.send(recipient, subject, content))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::external_service(format!(
                "Send timed out after {}s",
                self.send_timeout.as_secs()
            ))),
        }
    }

    /// Record a failed attempt: bump the retry count and schedule the next
    /// retry window from the backoff table. The requeue sweep enforces the
    /// retry ceiling, so the window is recorded even past it.
    async fn record_send_failure(&self, reminder: &Reminder, detail: &str) -> AppResult<()> {
        let retry_count = reminder.retry_count + 1;
        let next_retry_at = Utc::now() + self.backoff.delay_for(retry_count);
        self.reminders
            .mark_failed(reminder.id, detail, retry_count, Some(next_retry_at))
            .await
    }
}
