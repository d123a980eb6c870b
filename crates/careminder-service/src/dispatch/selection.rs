//! Channel selection policy.
//!
//! Exactly one channel is chosen before any send is attempted; the
//! dispatcher never tries a second channel within one attempt.

use careminder_entity::delivery::DeliveryChannel;
use careminder_entity::patient::Patient;

/// Select the delivery channel for a patient.
///
/// The patient's preferred channel wins when it is usable (configured and
/// backed by a non-empty contact field); otherwise the fixed fallback
/// order LINE → Email → SMS applies, stopping at the first channel with a
/// usable contact identifier. `usable` is the set of channels whose
/// senders are configured, with SMS already removed when feature-disabled.
pub fn select_channel(patient: &Patient, usable: &[DeliveryChannel]) -> Option<DeliveryChannel> {
    if let Some(preferred) = patient.preferred_contact_method {
        if usable.contains(&preferred) && patient.contact_for(preferred).is_some() {
            return Some(preferred);
        }
    }

    DeliveryChannel::FALLBACK_ORDER
        .into_iter()
        .find(|ch| usable.contains(ch) && patient.contact_for(*ch).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    const ALL: [DeliveryChannel; 3] = DeliveryChannel::FALLBACK_ORDER;

    fn patient(
        line: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        preferred: Option<DeliveryChannel>,
    ) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: "Tanaka Taro".to_string(),
            line_user_id: line.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
            preferred_contact_method: preferred,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn preferred_channel_wins_when_usable() {
        let p = patient(Some("U1"), Some("t@example.com"), None, Some(DeliveryChannel::Email));
        assert_eq!(select_channel(&p, &ALL), Some(DeliveryChannel::Email));
    }

    #[test]
    fn unreachable_preference_falls_back_in_fixed_order() {
        // Preference set to LINE but no LINE ID on file: email wins.
        let p = patient(None, Some("t@example.com"), None, Some(DeliveryChannel::Line));
        assert_eq!(select_channel(&p, &ALL), Some(DeliveryChannel::Email));
    }

    #[test]
    fn no_preference_uses_fallback_order() {
        let p = patient(Some("U1"), Some("t@example.com"), Some("+81"), None);
        assert_eq!(select_channel(&p, &ALL), Some(DeliveryChannel::Line));
    }

    #[test]
    fn email_only_patient_selects_email() {
        let p = patient(None, Some("t@example.com"), None, None);
        assert_eq!(select_channel(&p, &ALL), Some(DeliveryChannel::Email));
    }

    #[test]
    fn sms_skipped_when_not_usable() {
        let p = patient(None, None, Some("+819000000000"), None);
        let without_sms = [DeliveryChannel::Line, DeliveryChannel::Email];
        assert_eq!(select_channel(&p, &without_sms), None);
        assert_eq!(select_channel(&p, &ALL), Some(DeliveryChannel::Sms));
    }

    #[test]
    fn no_contact_fields_selects_nothing() {
        let p = patient(None, None, None, Some(DeliveryChannel::Line));
        assert_eq!(select_channel(&p, &ALL), None);
    }
}
