//! Delivery repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use careminder_core::error::{AppError, ErrorKind};
use careminder_core::result::AppResult;
use careminder_entity::delivery::{Delivery, DeliveryStatus};

use crate::store::DeliveryStore;

/// Repository for delivery audit rows.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryStore for DeliveryRepository {
    async fn insert(&self, delivery: &Delivery) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO deliveries \
             (id, patient_id, appointment_id, reminder_id, channel, kind, status, subject, \
              content, sent_at, opened_at, read_at, error_message, retry_count, created_at, \
              updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(delivery.id)
        .bind(delivery.patient_id)
        .bind(delivery.appointment_id)
        .bind(delivery.reminder_id)
        .bind(delivery.channel)
        .bind(delivery.kind)
        .bind(delivery.status)
        .bind(&delivery.subject)
        .bind(&delivery.content)
        .bind(delivery.sent_at)
        .bind(delivery.opened_at)
        .bind(delivery.read_at)
        .bind(&delivery.error_message)
        .bind(delivery.retry_count)
        .bind(delivery.created_at)
        .bind(delivery.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert delivery", e))?;
        Ok(())
    }

    async fn find_for_reminder(&self, reminder_id: Uuid) -> AppResult<Vec<Delivery>> {
        sqlx::query_as::<_, Delivery>(
            "SELECT * FROM deliveries WHERE reminder_id = $1 ORDER BY created_at ASC",
        )
        .bind(reminder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list deliveries", e))
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE deliveries SET status = 'sent', sent_at = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark delivery as sent", e)
        })?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE deliveries SET status = 'failed', error_message = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark delivery as failed", e)
        })?;
        Ok(())
    }

    async fn count_since(&self, status: DeliveryStatus, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM deliveries WHERE status = $1 AND updated_at >= $2",
        )
        .bind(status)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count deliveries", e))
    }
}
