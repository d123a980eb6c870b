//! # careminder-database
//!
//! PostgreSQL connection management, the store traits that the service
//! layer is written against, concrete Postgres repositories, and in-memory
//! store implementations for single-node and test use.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use store::{AppointmentStore, DeliveryStore, PatientStore, ReminderStore};
