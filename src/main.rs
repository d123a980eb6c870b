//! CareMinder daemon — appointment reminder delivery for Aozora Dental.
//!
//! Main entry point that wires stores, channel senders, and services
//! together and runs the periodic drivers until shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use careminder_core::config::AppConfig;
use careminder_core::error::AppError;
use careminder_service::cycle::DailyCycleService;
use careminder_service::dispatch::{DeliveryDispatcher, SenderRegistry};
use careminder_service::health::HealthCheckService;
use careminder_service::schedule::ReminderScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("CAREMINDER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("CareMinder error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CareMinder v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = careminder_database::connection::create_pool(&config.database).await?;

    careminder_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Initialize stores ────────────────────────────────
    let appointment_store: Arc<dyn careminder_database::AppointmentStore> = Arc::new(
        careminder_database::repositories::AppointmentRepository::new(db_pool.clone()),
    );
    let patient_store: Arc<dyn careminder_database::PatientStore> = Arc::new(
        careminder_database::repositories::PatientRepository::new(db_pool.clone()),
    );
    let reminder_store: Arc<dyn careminder_database::ReminderStore> = Arc::new(
        careminder_database::repositories::ReminderRepository::new(db_pool.clone()),
    );
    let delivery_store: Arc<dyn careminder_database::DeliveryStore> = Arc::new(
        careminder_database::repositories::DeliveryRepository::new(db_pool.clone()),
    );

    // ── Step 3: Initialize channel senders ───────────────────────
    tracing::info!("Initializing channel senders...");
    let send_timeout = std::time::Duration::from_secs(config.delivery.send_timeout_seconds);

    let mut registry = SenderRegistry::new();
    registry.register(Arc::new(careminder_channel::LineSender::new(
        config.channels.line.clone(),
        send_timeout,
    )?));
    registry.register(Arc::new(careminder_channel::EmailSender::new(
        config.channels.email.clone(),
        send_timeout,
    )?));
    registry.register(Arc::new(careminder_channel::SmsSender::new(
        config.channels.sms.clone(),
        send_timeout,
    )?));
    let registry = Arc::new(registry);

    // ── Step 4: Initialize services ──────────────────────────────
    let scheduler = Arc::new(ReminderScheduler::new(Arc::clone(&reminder_store)));
    let dispatcher = Arc::new(DeliveryDispatcher::new(
        Arc::clone(&reminder_store),
        Arc::clone(&delivery_store),
        Arc::clone(&appointment_store),
        Arc::clone(&patient_store),
        Arc::clone(&registry),
        config.clinic.clone(),
        &config.delivery,
    ));
    let cycle = Arc::new(DailyCycleService::new(
        Arc::clone(&appointment_store),
        Arc::clone(&reminder_store),
        Arc::clone(&scheduler),
        Arc::clone(&dispatcher),
        config.worker.sweep_batch_size,
    ));
    let health = Arc::new(HealthCheckService::new(
        Arc::clone(&reminder_store),
        Arc::clone(&delivery_store),
        Arc::clone(&dispatcher),
        config.channels.clone(),
        config.delivery.clone(),
        config.worker.sweep_batch_size,
    ));
    tracing::info!("Services initialized");

    // Surface configuration gaps immediately rather than at the first cron
    // firing.
    match health.run().await {
        Ok(report) => {
            for warning in &report.config_warnings {
                tracing::warn!(warning = %warning, "Startup configuration audit");
            }
        }
        Err(e) => tracing::warn!("Startup health check failed: {}", e),
    }

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 6: Start background workers ─────────────────────────
    let worker_handle = if config.worker.enabled {
        tracing::info!("Starting sweep runner...");
        let runner = careminder_worker::SweepRunner::new(
            Arc::clone(&reminder_store),
            Arc::clone(&dispatcher),
            config.worker.clone(),
        );

        let worker_cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            runner.run(worker_cancel).await;
        });

        tracing::info!("Sweep runner started");
        Some(handle)
    } else {
        tracing::info!("Sweep runner disabled");
        None
    };

    let mut cron = careminder_worker::CronScheduler::new(Arc::clone(&cycle), Arc::clone(&health))
        .await?;
    cron.register_default_tasks().await?;
    cron.start().await?;

    tracing::info!("CareMinder running; press Ctrl+C to stop");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    cron.shutdown().await?;

    if let Some(handle) = worker_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    db_pool.close().await;

    tracing::info!("CareMinder shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
