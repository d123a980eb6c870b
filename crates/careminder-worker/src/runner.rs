//! Sweep runner — main loop that polls for due reminders and dispatches them.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Semaphore};
use tokio::time;
use tracing;

use careminder_core::config::WorkerConfig;
use careminder_database::store::ReminderStore;
use careminder_service::dispatch::{DeliveryDispatcher, DispatchOutcome};

/// Polls the reminder store for due rows and hands each to the dispatcher.
///
/// Safe to run at any frequency alongside the daily cycle: the
/// dispatcher's claim step means a reminder picked up by two sweeps is
/// still sent at most once.
pub struct SweepRunner {
    /// Reminder store polled for due rows.
    reminders: Arc<dyn ReminderStore>,
    /// Dispatcher invoked per due reminder.
    dispatcher: Arc<DeliveryDispatcher>,
    /// Worker configuration.
    config: WorkerConfig,
}

impl SweepRunner {
    /// Create a new sweep runner.
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        dispatcher: Arc<DeliveryDispatcher>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            reminders,
            dispatcher,
            config,
        }
    }

    /// Start the sweep runner — runs until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            concurrency = self.config.concurrency,
            interval_seconds = self.config.sweep_interval_seconds,
            batch_size = self.config.sweep_batch_size,
            "Sweep runner started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let poll_interval = Duration::from_secs(self.config.sweep_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!("Sweep runner received shutdown signal");
                        break;
                    }
                }
                _ = self.poll_and_dispatch(&semaphore) => {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                tracing::info!("Sweep runner shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!("Sweep runner waiting for in-flight dispatches to complete...");

        let max_permits = self.config.concurrency as u32;
        let _ = tokio::time::timeout(
            Duration::from_secs(30),
            semaphore.acquire_many(max_permits),
        )
        .await;

        tracing::info!("Sweep runner shut down complete");
    }

    /// Fetch one batch of due reminders and dispatch them concurrently.
    async fn poll_and_dispatch(&self, semaphore: &Arc<Semaphore>) {
        let due = match self
            .reminders
            .find_due(Utc::now(), self.config.sweep_batch_size)
            .await
        {
            Ok(due) => due,
            Err(e) => {
                tracing::error!("Failed to fetch due reminders: {}", e);
                return;
            }
        };

        if due.is_empty() {
            tracing::trace!("No reminders due");
            return;
        }

        tracing::debug!("Dispatching {} due reminders", due.len());

        for reminder in due {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => return,
            };
            let dispatcher = Arc::clone(&self.dispatcher);
            let reminder_id = reminder.id;

            tokio::spawn(async move {
                let _permit = permit;

                match dispatcher.deliver(reminder_id).await {
                    Ok(DispatchOutcome::Sent(channel)) => {
                        tracing::info!(
                            reminder_id = %reminder_id,
                            channel = %channel,
                            "Sweep delivered reminder"
                        );
                    }
                    Ok(outcome) => {
                        tracing::debug!(
                            reminder_id = %reminder_id,
                            outcome = ?outcome,
                            "Sweep dispatch ended without a send"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            reminder_id = %reminder_id,
                            "Sweep dispatch error: {}",
                            e
                        );
                    }
                }
            });
        }
    }
}
