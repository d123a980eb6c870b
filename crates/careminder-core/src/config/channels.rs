//! Per-channel credential and feature-flag configuration.
//!
//! A channel whose credentials are left empty is silently skipped by the
//! dispatcher's fallback policy; the health check reports the missing
//! configuration as a warning rather than a fatal error.

use serde::{Deserialize, Serialize};

/// Configuration for all delivery channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,
    /// SMTP email settings.
    #[serde(default)]
    pub email: EmailConfig,
    /// SMS gateway settings.
    #[serde(default)]
    pub sms: SmsConfig,
}

/// LINE Messaging API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Long-lived channel access token.
    #[serde(default)]
    pub channel_access_token: String,
    /// Push-message endpoint.
    #[serde(default = "default_line_api_url")]
    pub api_url: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            api_url: default_line_api_url(),
        }
    }
}

/// SMTP email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// From address on outgoing mail.
    #[serde(default)]
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: String::new(),
        }
    }
}

/// SMS gateway (Twilio-compatible) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Feature flag gating whether SMS is ever attempted as a fallback.
    #[serde(default)]
    pub enabled: bool,
    /// Gateway account identifier.
    #[serde(default)]
    pub account_sid: String,
    /// Gateway auth token.
    #[serde(default)]
    pub auth_token: String,
    /// Sender phone number.
    #[serde(default)]
    pub from_number: String,
    /// Messages endpoint.
    #[serde(default)]
    pub api_url: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            api_url: String::new(),
        }
    }
}

fn default_line_api_url() -> String {
    "https://api.line.me/v2/bot/message/push".to_string()
}

fn default_smtp_port() -> u16 {
    587
}
