//! # careminder-channel
//!
//! Channel senders for patient-facing messages: LINE push messages, SMTP
//! email, and a Twilio-compatible SMS gateway, all behind the
//! [`ChannelSender`] trait. Senders never retry internally — retry policy
//! lives entirely in the dispatcher.

pub mod email;
pub mod line;
pub mod mock;
pub mod sender;
pub mod sms;

pub use email::EmailSender;
pub use line::LineSender;
pub use mock::MockSender;
pub use sender::ChannelSender;
pub use sms::SmsSender;
