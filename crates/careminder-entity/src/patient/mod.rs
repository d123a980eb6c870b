//! Patient domain entities (consumed read-only by the reminder core).

pub mod model;

pub use model::Patient;
