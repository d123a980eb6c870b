//! Delivery dispatch — turns a due reminder into one channel send attempt.

pub mod backoff;
pub mod registry;
pub mod selection;
pub mod service;

pub use backoff::BackoffSchedule;
pub use registry::SenderRegistry;
pub use service::{DeliveryDispatcher, DispatchOutcome, SkipReason};
