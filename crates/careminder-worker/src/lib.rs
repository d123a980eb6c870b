//! Background processing for CareMinder.
//!
//! This crate provides:
//! - A sweep runner that polls for due reminders and dispatches them with
//!   bounded concurrency
//! - A cron scheduler that triggers the daily cycle and the periodic
//!   health/reconciliation check

pub mod runner;
pub mod scheduler;

pub use runner::SweepRunner;
pub use scheduler::CronScheduler;
