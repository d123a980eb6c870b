//! Delivery domain entities.

pub mod channel;
pub mod model;
pub mod status;

pub use channel::DeliveryChannel;
pub use model::Delivery;
pub use status::DeliveryStatus;
