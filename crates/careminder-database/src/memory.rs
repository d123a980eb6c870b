//! In-memory store implementations using Tokio mutexes.
//!
//! Honest mirrors of the Postgres repositories for single-node use and for
//! exercising the service layer without a database. Each conditional
//! transition holds the store lock for the whole check-and-set, so the
//! claim semantics match the single-statement SQL updates.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use careminder_core::result::AppResult;
use careminder_entity::appointment::{Appointment, AppointmentStatus};
use careminder_entity::delivery::{Delivery, DeliveryStatus};
use careminder_entity::patient::Patient;
use careminder_entity::reminder::{Reminder, ReminderKind, ReminderStatus};

use crate::store::{AppointmentStore, DeliveryStore, PatientStore, ReminderStore};

/// In-memory appointment store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAppointmentStore {
    rows: Arc<Mutex<HashMap<Uuid, Appointment>>>,
}

impl MemoryAppointmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an appointment row.
    pub async fn put(&self, appointment: Appointment) {
        self.rows.lock().await.insert(appointment.id, appointment);
    }

    /// Overwrite an appointment's status, as the booking subsystem would.
    pub async fn set_status(&self, id: Uuid, status: AppointmentStatus) {
        if let Some(row) = self.rows.lock().await.get_mut(&id) {
            row.status = status;
            row.updated_at = Utc::now();
        }
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn find_active_on(&self, date: NaiveDate) -> AppResult<Vec<Appointment>> {
        let rows = self.rows.lock().await;
        let mut matches: Vec<Appointment> = rows
            .values()
            .filter(|a| a.scheduled_at.date_naive() == date && !a.status.blocks_delivery())
            .cloned()
            .collect();
        matches.sort_by_key(|a| a.scheduled_at);
        Ok(matches)
    }
}

/// In-memory patient store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatientStore {
    rows: Arc<Mutex<HashMap<Uuid, Patient>>>,
}

impl MemoryPatientStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a patient row.
    pub async fn put(&self, patient: Patient) {
        self.rows.lock().await.insert(patient.id, patient);
    }
}

#[async_trait]
impl PatientStore for MemoryPatientStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Patient>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }
}

/// In-memory reminder store.
#[derive(Debug, Clone, Default)]
pub struct MemoryReminderStore {
    rows: Arc<Mutex<HashMap<Uuid, Reminder>>>,
}

impl MemoryReminderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderStore for MemoryReminderStore {
    async fn insert(&self, reminder: &Reminder) -> AppResult<()> {
        self.rows.lock().await.insert(reminder.id, reminder.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reminder>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn find_for_appointment(&self, appointment_id: Uuid) -> AppResult<Vec<Reminder>> {
        let rows = self.rows.lock().await;
        let mut matches: Vec<Reminder> = rows
            .values()
            .filter(|r| r.appointment_id == appointment_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn exists_for_kind(&self, appointment_id: Uuid, kind: ReminderKind) -> AppResult<bool> {
        let rows = self.rows.lock().await;
        Ok(rows.values().any(|r| {
            r.appointment_id == appointment_id
                && r.kind == kind
                && r.status != ReminderStatus::Cancelled
        }))
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Reminder>> {
        let rows = self.rows.lock().await;
        let mut due: Vec<Reminder> = rows
            .values()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|r| r.scheduled_at);
        due.truncate(limit.max(0) as usize);
        Ok(due)
    }

    async fn claim_for_dispatch(&self, id: Uuid) -> AppResult<Option<Reminder>> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&id) {
            Some(row) if row.status == ReminderStatus::Pending => {
                row.status = ReminderStatus::Sending;
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<()> {
        if let Some(row) = self.rows.lock().await.get_mut(&id) {
            row.status = ReminderStatus::Sent;
            row.sent_at = Some(sent_at);
            row.retry_count = 0;
            row.error_message = None;
            row.next_retry_at = None;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        error_message: &str,
        retry_count: i32,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        if let Some(row) = self.rows.lock().await.get_mut(&id) {
            row.status = ReminderStatus::Failed;
            row.error_message = Some(error_message.to_string());
            row.retry_count = retry_count;
            row.next_retry_at = next_retry_at;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_cancelled(&self, id: Uuid) -> AppResult<()> {
        if let Some(row) = self.rows.lock().await.get_mut(&id) {
            if matches!(row.status, ReminderStatus::Pending | ReminderStatus::Sending) {
                row.status = ReminderStatus::Cancelled;
                row.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn cancel_pending_for_appointment(&self, appointment_id: Uuid) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let mut cancelled = 0u64;
        for row in rows.values_mut() {
            if row.appointment_id == appointment_id && row.status == ReminderStatus::Pending {
                row.status = ReminderStatus::Cancelled;
                row.updated_at = Utc::now();
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    async fn requeue_failed(&self, now: DateTime<Utc>, retry_ceiling: i32) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let mut requeued = 0u64;
        for row in rows.values_mut() {
            if row.status == ReminderStatus::Failed
                && row.retry_count < retry_ceiling
                && row.next_retry_at.is_some_and(|at| at <= now)
            {
                row.status = ReminderStatus::Pending;
                row.updated_at = Utc::now();
                requeued += 1;
            }
        }
        Ok(requeued)
    }

    async fn release_stale_sending(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let mut released = 0u64;
        for row in rows.values_mut() {
            if row.status == ReminderStatus::Sending && row.updated_at < cutoff {
                row.status = ReminderStatus::Pending;
                row.updated_at = Utc::now();
                released += 1;
            }
        }
        Ok(released)
    }
}

/// In-memory delivery store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDeliveryStore {
    rows: Arc<Mutex<HashMap<Uuid, Delivery>>>,
}

impl MemoryDeliveryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a delivery row (used to backfill history in tests).
    pub async fn put(&self, delivery: Delivery) {
        self.rows.lock().await.insert(delivery.id, delivery);
    }
}

#[async_trait]
impl DeliveryStore for MemoryDeliveryStore {
    async fn insert(&self, delivery: &Delivery) -> AppResult<()> {
        self.rows.lock().await.insert(delivery.id, delivery.clone());
        Ok(())
    }

    async fn find_for_reminder(&self, reminder_id: Uuid) -> AppResult<Vec<Delivery>> {
        let rows = self.rows.lock().await;
        let mut matches: Vec<Delivery> = rows
            .values()
            .filter(|d| d.reminder_id == Some(reminder_id))
            .cloned()
            .collect();
        matches.sort_by_key(|d| d.created_at);
        Ok(matches)
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<()> {
        if let Some(row) = self.rows.lock().await.get_mut(&id) {
            row.status = DeliveryStatus::Sent;
            row.sent_at = Some(sent_at);
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<()> {
        if let Some(row) = self.rows.lock().await.get_mut(&id) {
            row.status = DeliveryStatus::Failed;
            row.error_message = Some(error_message.to_string());
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn count_since(&self, status: DeliveryStatus, since: DateTime<Utc>) -> AppResult<i64> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .filter(|d| d.status == status && d.updated_at >= since)
            .count() as i64)
    }
}
