//! Daily cycle driver — the once-a-day sweep pair.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use careminder_core::result::AppResult;
use careminder_database::store::{AppointmentStore, ReminderStore};

use crate::dispatch::{DeliveryDispatcher, DispatchOutcome};
use crate::schedule::ReminderScheduler;

/// Appointment-date offsets (in days) covered by the materialization sweep.
const MATERIALIZATION_OFFSETS: [u64; 2] = [7, 3];

/// Counts reported by one daily cycle run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Reminders successfully handed to a channel.
    pub delivered: u64,
    /// Reminder rows newly materialized.
    pub created: u64,
}

/// Runs the daily reminder cycle: deliver what is due, then materialize
/// reminder rows for upcoming appointments.
#[derive(Clone)]
pub struct DailyCycleService {
    /// Appointment store (read-only).
    appointments: Arc<dyn AppointmentStore>,
    /// Reminder store.
    reminders: Arc<dyn ReminderStore>,
    /// Scheduler used by the materialization sweep.
    scheduler: Arc<ReminderScheduler>,
    /// Dispatcher used by the delivery sweep.
    dispatcher: Arc<DeliveryDispatcher>,
    /// Maximum reminders fetched per sweep batch.
    batch_size: i64,
}

impl DailyCycleService {
    /// Creates a new daily cycle service.
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        reminders: Arc<dyn ReminderStore>,
        scheduler: Arc<ReminderScheduler>,
        dispatcher: Arc<DeliveryDispatcher>,
        batch_size: i64,
    ) -> Self {
        Self {
            appointments,
            reminders,
            scheduler,
            dispatcher,
            batch_size,
        }
    }

    /// Run one daily cycle as of `as_of`.
    ///
    /// Idempotent: rerunning for the same date neither duplicates reminder
    /// rows (the scheduler's existence guard) nor re-sends delivered ones
    /// (the dispatcher only claims pending rows).
    pub async fn run_cycle(&self, as_of: NaiveDate) -> AppResult<CycleSummary> {
        info!(as_of = %as_of, "Starting daily reminder cycle");

        let delivered = self.delivery_sweep().await?;
        let created = self.materialization_sweep(as_of).await?;

        info!(as_of = %as_of, delivered, created, "Daily reminder cycle complete");
        Ok(CycleSummary { delivered, created })
    }

    /// Dispatch every pending reminder that is due now.
    ///
    /// Safe to run at any frequency; each batch only acts on due pending
    /// rows, and one reminder's failure never aborts the rest.
    pub async fn delivery_sweep(&self) -> AppResult<u64> {
        let mut delivered = 0u64;

        loop {
            let due = self.reminders.find_due(Utc::now(), self.batch_size).await?;
            if due.is_empty() {
                break;
            }
            let fetched = due.len();

            for reminder in due {
                match self.dispatcher.deliver(reminder.id).await {
                    Ok(DispatchOutcome::Sent(_)) => delivered += 1,
                    Ok(_) => {}
                    Err(e) => {
                        error!(
                            reminder_id = %reminder.id,
                            error = %e,
                            "Dispatch error during delivery sweep, continuing"
                        );
                    }
                }
            }

            if fetched < self.batch_size.max(0) as usize {
                break;
            }
        }

        Ok(delivered)
    }

    /// Materialize reminder rows for appointments 7 and 3 days out.
    async fn materialization_sweep(&self, as_of: NaiveDate) -> AppResult<u64> {
        let mut created = 0u64;

        for offset in MATERIALIZATION_OFFSETS {
            let Some(target) = as_of.checked_add_days(Days::new(offset)) else {
                continue;
            };

            for appointment in self.appointments.find_active_on(target).await? {
                match self.scheduler.schedule_for_appointment(&appointment).await {
                    Ok(new) => created += new.len() as u64,
                    Err(e) => {
                        error!(
                            appointment_id = %appointment.id,
                            error = %e,
                            "Scheduling error during materialization sweep, continuing"
                        );
                    }
                }
            }
        }

        Ok(created)
    }
}
