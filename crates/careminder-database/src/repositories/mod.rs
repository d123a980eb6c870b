//! Concrete Postgres repository implementations of the store traits.

pub mod appointment;
pub mod delivery;
pub mod patient;
pub mod reminder;

pub use appointment::AppointmentRepository;
pub use delivery::DeliveryRepository;
pub use patient::PatientRepository;
pub use reminder::ReminderRepository;
