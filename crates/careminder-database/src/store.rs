//! Store traits the service layer is written against.
//!
//! Each entity gets a narrow, domain-specific trait instead of a generic
//! CRUD interface: the service layer only ever needs the operations listed
//! here, and keeping the surface small lets the in-memory implementations
//! in [`crate::memory`] stay honest mirrors of the Postgres ones.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use careminder_core::result::AppResult;
use careminder_entity::appointment::Appointment;
use careminder_entity::delivery::{Delivery, DeliveryStatus};
use careminder_entity::patient::Patient;
use careminder_entity::reminder::{Reminder, ReminderKind};

/// Read-only access to appointments.
///
/// The reminder core never mutates appointments; the booking subsystem
/// owns them.
#[async_trait]
pub trait AppointmentStore: Send + Sync + 'static {
    /// Find an appointment by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>>;

    /// Find appointments taking place on `date` whose status still allows
    /// reminder delivery (not cancelled, not no-show).
    async fn find_active_on(&self, date: NaiveDate) -> AppResult<Vec<Appointment>>;
}

/// Read-only access to patients.
#[async_trait]
pub trait PatientStore: Send + Sync + 'static {
    /// Find a patient by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Patient>>;
}

/// Reminder persistence and state transitions.
///
/// All mutation is via single-row updates keyed by primary key; the
/// conditional transitions (`claim_for_dispatch`, `mark_cancelled`) are
/// the concurrency guards the dispatcher relies on.
#[async_trait]
pub trait ReminderStore: Send + Sync + 'static {
    /// Persist a freshly built reminder.
    async fn insert(&self, reminder: &Reminder) -> AppResult<()>;

    /// Find a reminder by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reminder>>;

    /// List all reminders for an appointment, newest first.
    async fn find_for_appointment(&self, appointment_id: Uuid) -> AppResult<Vec<Reminder>>;

    /// Check whether a non-cancelled reminder of `kind` already exists for
    /// the appointment. Backs the scheduler's idempotency guard.
    async fn exists_for_kind(&self, appointment_id: Uuid, kind: ReminderKind) -> AppResult<bool>;

    /// Fetch up to `limit` pending reminders due at or before `now`.
    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Reminder>>;

    /// Atomically claim a pending reminder for dispatch by transitioning it
    /// to the in-flight state. Returns `None` if the reminder is no longer
    /// pending — the loser of a concurrent claim race observes this.
    async fn claim_for_dispatch(&self, id: Uuid) -> AppResult<Option<Reminder>>;

    /// Record a successful send: status sent, retry bookkeeping cleared.
    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<()>;

    /// Record a failed attempt with the updated retry bookkeeping.
    async fn mark_failed(
        &self,
        id: Uuid,
        error_message: &str,
        retry_count: i32,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Cancel a single claimed or pending reminder in place.
    async fn mark_cancelled(&self, id: Uuid) -> AppResult<()>;

    /// Cancel every pending reminder of an appointment in one statement.
    /// Returns the number of reminders cancelled.
    async fn cancel_pending_for_appointment(&self, appointment_id: Uuid) -> AppResult<u64>;

    /// Requeue failed reminders whose backoff window has elapsed and whose
    /// retry count is still under the ceiling. Returns the number requeued.
    async fn requeue_failed(&self, now: DateTime<Utc>, retry_ceiling: i32) -> AppResult<u64>;

    /// Release reminders stuck in the in-flight state since before `cutoff`
    /// (their worker died mid-send) back to pending.
    async fn release_stale_sending(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Delivery audit-row persistence.
#[async_trait]
pub trait DeliveryStore: Send + Sync + 'static {
    /// Persist a freshly built delivery row.
    async fn insert(&self, delivery: &Delivery) -> AppResult<()>;

    /// List all delivery attempts recorded for a reminder, oldest first.
    async fn find_for_reminder(&self, reminder_id: Uuid) -> AppResult<Vec<Delivery>>;

    /// Record that the channel accepted the message.
    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<()>;

    /// Record that the attempt failed.
    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<()>;

    /// Count delivery rows with `status` resolved at or after `since`.
    /// Backs the health check's trailing success-rate window.
    async fn count_since(&self, status: DeliveryStatus, since: DateTime<Utc>) -> AppResult<i64>;
}
