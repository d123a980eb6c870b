//! # careminder-entity
//!
//! Domain entity models for Aozora CareMinder. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod appointment;
pub mod delivery;
pub mod patient;
pub mod reminder;
