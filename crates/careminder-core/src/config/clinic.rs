//! Clinic identity configuration.

use serde::{Deserialize, Serialize};

/// Clinic identity used when rendering patient-facing messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// Display name interpolated into message templates.
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Phone number patients should call to change an appointment.
    #[serde(default)]
    pub contact_phone: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            contact_phone: String::new(),
        }
    }
}

fn default_display_name() -> String {
    "Aozora Dental Clinic".to_string()
}
