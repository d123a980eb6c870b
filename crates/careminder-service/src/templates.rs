//! Patient-facing message templates.
//!
//! One template per reminder kind, with the clinic display name and the
//! formatted appointment time interpolated. SMS bodies reuse the email
//! body except where a dedicated SMS variant exists; the 160-character
//! hard cut is applied at send time, not here.

use chrono::{DateTime, Utc};

use careminder_core::config::clinic::ClinicConfig;
use careminder_entity::appointment::Appointment;
use careminder_entity::patient::Patient;
use careminder_entity::reminder::{Reminder, ReminderKind};

/// A rendered message, ready for the chosen channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Subject line (ignored by channels without one).
    pub subject: String,
    /// Body for LINE and email.
    pub body: String,
    /// Body for SMS, before truncation.
    pub sms_body: String,
}

/// Render the message for a reminder.
pub fn render(
    reminder: &Reminder,
    appointment: &Appointment,
    patient: &Patient,
    clinic: &ClinicConfig,
) -> RenderedMessage {
    let when = format_appointment_time(appointment.scheduled_at);
    let name = patient.name.as_str();
    let clinic_name = clinic.display_name.as_str();

    match reminder.kind {
        ReminderKind::SevenDays => {
            let body = format!(
                "Dear {name},\n\n\
                 This is a reminder that you have an appointment at {clinic_name} \
                 on {when}.\n\n\
                 We look forward to seeing you."
            );
            RenderedMessage {
                subject: "Reminder: appointment in one week".to_string(),
                sms_body: body.clone(),
                body,
            }
        }
        ReminderKind::ThreeDays => {
            let body = format!(
                "Dear {name},\n\n\
                 This is a reminder that you have an appointment at {clinic_name} \
                 on {when}.\n\n\
                 We look forward to seeing you."
            );
            let sms_body = format!("{body}\nPlease bring your insurance card.");
            RenderedMessage {
                subject: "Reminder: appointment in three days".to_string(),
                body,
                sms_body,
            }
        }
        ReminderKind::OneDay => {
            let contact = if clinic.contact_phone.is_empty() {
                String::new()
            } else {
                format!(" at {}", clinic.contact_phone)
            };
            let body = format!(
                "Dear {name},\n\n\
                 Your appointment at {clinic_name} is coming up on {when}. \
                 If you are unable to attend, please contact the clinic{contact} \
                 as soon as possible."
            );
            RenderedMessage {
                subject: "Reminder: appointment tomorrow".to_string(),
                sms_body: body.clone(),
                body,
            }
        }
        ReminderKind::Manual => {
            let body = reminder.message_content.clone().unwrap_or_default();
            RenderedMessage {
                subject: format!("Message from {clinic_name}"),
                sms_body: body.clone(),
                body,
            }
        }
    }
}

/// Format an appointment time for patient-facing text.
fn format_appointment_time(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y at %H:%M").to_string()
}
