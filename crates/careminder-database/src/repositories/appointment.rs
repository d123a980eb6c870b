//! Appointment repository implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use careminder_core::error::{AppError, ErrorKind};
use careminder_core::result::AppResult;
use careminder_entity::appointment::Appointment;

use crate::store::AppointmentStore;

/// Repository for read-only appointment queries.
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    /// Create a new appointment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find appointment", e))
    }

    async fn find_active_on(&self, date: NaiveDate) -> AppResult<Vec<Appointment>> {
        let day_start = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        let day_end = date
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());

        let (Some(day_start), Some(day_end)) = (day_start, day_end) else {
            return Err(AppError::validation(format!("Invalid sweep date: {date}")));
        };

        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments \
             WHERE scheduled_at >= $1 AND scheduled_at < $2 \
             AND status NOT IN ('cancelled', 'no_show') \
             ORDER BY scheduled_at ASC",
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list appointments", e))
    }
}
