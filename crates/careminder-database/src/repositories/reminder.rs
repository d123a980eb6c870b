//! Reminder repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use careminder_core::error::{AppError, ErrorKind};
use careminder_core::result::AppResult;
use careminder_entity::reminder::{Reminder, ReminderKind};

use crate::store::ReminderStore;

/// Repository for reminder CRUD and state transitions.
#[derive(Debug, Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    /// Create a new reminder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for ReminderRepository {
    async fn insert(&self, reminder: &Reminder) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reminders \
             (id, appointment_id, kind, scheduled_at, status, retry_count, next_retry_at, \
              error_message, message_content, sent_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(reminder.id)
        .bind(reminder.appointment_id)
        .bind(reminder.kind)
        .bind(reminder.scheduled_at)
        .bind(reminder.status)
        .bind(reminder.retry_count)
        .bind(reminder.next_retry_at)
        .bind(&reminder.error_message)
        .bind(&reminder.message_content)
        .bind(reminder.sent_at)
        .bind(reminder.created_at)
        .bind(reminder.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert reminder", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reminder>> {
        sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find reminder", e))
    }

    async fn find_for_appointment(&self, appointment_id: Uuid) -> AppResult<Vec<Reminder>> {
        sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE appointment_id = $1 ORDER BY created_at DESC",
        )
        .bind(appointment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reminders", e))
    }

    async fn exists_for_kind(&self, appointment_id: Uuid, kind: ReminderKind) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                SELECT 1 FROM reminders \
                WHERE appointment_id = $1 AND kind = $2 AND status <> 'cancelled' \
             )",
        )
        .bind(appointment_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check reminder existence", e)
        })
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Reminder>> {
        sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders \
             WHERE status = 'pending' AND scheduled_at <= $1 \
             ORDER BY scheduled_at ASC LIMIT $2",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list due reminders", e))
    }

    async fn claim_for_dispatch(&self, id: Uuid) -> AppResult<Option<Reminder>> {
        // The single-statement conditional update is the double-send guard:
        // of two concurrent claims, exactly one matches status = 'pending'.
        sqlx::query_as::<_, Reminder>(
            "UPDATE reminders SET status = 'sending', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim reminder", e))
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE reminders SET status = 'sent', sent_at = $2, retry_count = 0, \
             error_message = NULL, next_retry_at = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark reminder as sent", e)
        })?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        error_message: &str,
        retry_count: i32,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE reminders SET status = 'failed', error_message = $2, retry_count = $3, \
             next_retry_at = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error_message)
        .bind(retry_count)
        .bind(next_retry_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark reminder as failed", e)
        })?;
        Ok(())
    }

    async fn mark_cancelled(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE reminders SET status = 'cancelled', updated_at = NOW() \
             WHERE id = $1 AND status IN ('pending', 'sending')",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel reminder", e))?;
        Ok(())
    }

    async fn cancel_pending_for_appointment(&self, appointment_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE reminders SET status = 'cancelled', updated_at = NOW() \
             WHERE appointment_id = $1 AND status = 'pending'",
        )
        .bind(appointment_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to cancel reminders", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn requeue_failed(&self, now: DateTime<Utc>, retry_ceiling: i32) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE reminders SET status = 'pending', updated_at = NOW() \
             WHERE status = 'failed' AND retry_count < $2 \
             AND next_retry_at IS NOT NULL AND next_retry_at <= $1",
        )
        .bind(now)
        .bind(retry_ceiling)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to requeue failed reminders", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn release_stale_sending(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE reminders SET status = 'pending', updated_at = NOW() \
             WHERE status = 'sending' AND updated_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release stale claims", e)
        })?;
        Ok(result.rows_affected())
    }
}
