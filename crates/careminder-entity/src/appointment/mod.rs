//! Appointment domain entities (consumed read-only by the reminder core).

pub mod model;
pub mod status;

pub use model::Appointment;
pub use status::AppointmentStatus;
