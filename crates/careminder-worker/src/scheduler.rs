//! Cron scheduler for the daily cycle and the periodic health check.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use careminder_core::error::AppError;
use careminder_service::cycle::DailyCycleService;
use careminder_service::health::HealthCheckService;

/// Cron-based scheduler for periodic reminder tasks.
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Daily cycle service
    cycle: Arc<DailyCycleService>,
    /// Health check service
    health: Arc<HealthCheckService>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(
        cycle: Arc<DailyCycleService>,
        health: Arc<HealthCheckService>,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            cycle,
            health,
        })
    }

    /// Register all default scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_daily_cycle().await?;
        self.register_health_check().await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Daily reminder cycle — midnight clinic time.
    async fn register_daily_cycle(&self) -> Result<(), AppError> {
        let cycle = Arc::clone(&self.cycle);
        let job = CronJob::new_async("0 0 0 * * *", move |_uuid, _lock| {
            let cycle = Arc::clone(&cycle);
            Box::pin(async move {
                let as_of = Utc::now().date_naive();
                match cycle.run_cycle(as_of).await {
                    Ok(summary) => {
                        tracing::info!(
                            delivered = summary.delivered,
                            created = summary.created,
                            "Daily cycle finished"
                        );
                    }
                    Err(e) => tracing::error!("Daily cycle failed: {}", e),
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create daily_cycle schedule: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add daily_cycle schedule: {}", e)))?;

        tracing::info!("Registered: daily_cycle (daily at midnight)");
        Ok(())
    }

    /// Health/reconciliation check — every 15 minutes.
    async fn register_health_check(&self) -> Result<(), AppError> {
        let health = Arc::clone(&self.health);
        let job = CronJob::new_async("0 */15 * * * *", move |_uuid, _lock| {
            let health = Arc::clone(&health);
            Box::pin(async move {
                match health.run().await {
                    Ok(report) => {
                        tracing::debug!(
                            sent = report.sent_count,
                            failed = report.failed_count,
                            requeued = report.requeued,
                            "Health check finished"
                        );
                    }
                    Err(e) => tracing::error!("Health check failed: {}", e),
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create health_check schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add health_check schedule: {}", e))
        })?;

        tracing::info!("Registered: health_check (every 15min)");
        Ok(())
    }
}
