//! Patient repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use careminder_core::error::{AppError, ErrorKind};
use careminder_core::result::AppResult;
use careminder_entity::patient::Patient;

use crate::store::PatientStore;

/// Repository for read-only patient queries.
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    /// Create a new patient repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PatientRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Patient>> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find patient", e))
    }
}
