//! Reminder scheduling — turns an appointment into its reminder sequence.

pub mod candidates;
pub mod service;

pub use service::ReminderScheduler;
