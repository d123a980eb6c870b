//! # careminder-service
//!
//! Business logic service layer for CareMinder. Each service orchestrates
//! the store traits and channel senders to implement one part of the
//! reminder pipeline: scheduling, dispatch, the daily cycle, and the
//! health/reconciliation check.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod cycle;
pub mod dispatch;
pub mod health;
pub mod hooks;
pub mod schedule;
pub mod templates;

pub use cycle::{CycleSummary, DailyCycleService};
pub use dispatch::{DeliveryDispatcher, DispatchOutcome, SenderRegistry, SkipReason};
pub use health::{HealthCheckService, HealthReport};
pub use hooks::AppointmentLifecycle;
pub use schedule::ReminderScheduler;
