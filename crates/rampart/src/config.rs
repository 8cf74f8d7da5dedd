//! Configuration management for Rampart.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use rampart_common::FieldKind;
use rampart_common::RampartError;
use rampart_common::constants::{
    CHALLENGE_MAX_OPERAND, CHALLENGE_MIN_OPERAND, DEFAULT_LISTEN_ADDR, DEFAULT_STORAGE_PATH,
    HONEYPOT_FIELD, MAX_SUBMISSIONS_PER_WINDOW, SIMULATED_FAILURE_RATE, SIMULATED_LATENCY_MS,
    SUBMISSION_WINDOW_SECS, durations,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Durable key-value store file
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Hidden anti-bot field injected into every form
    #[serde(default = "default_honeypot_field")]
    pub honeypot_field: String,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub captcha: CaptchaConfig,

    #[serde(default)]
    pub submitter: SubmitterConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    /// User-visible text
    #[serde(default)]
    pub messages: Messages,

    /// Forms served by this instance
    #[serde(default = "default_forms")]
    pub forms: Vec<FormConfig>,
}

/// Submission throttling
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Accepted submissions allowed inside the window
    #[serde(default = "default_max_submissions")]
    pub max_submissions: usize,

    /// Trailing window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
        }
    }
}

/// Arithmetic challenge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    #[serde(default = "default_min_operand")]
    pub min_operand: i32,

    #[serde(default = "default_max_operand")]
    pub max_operand: i32,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            min_operand: default_min_operand(),
            max_operand: default_max_operand(),
        }
    }
}

/// Simulated submission collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitterConfig {
    /// Artificial round-trip latency
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Probability (0.0 - 1.0) that a submission fails
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            failure_rate: default_failure_rate(),
        }
    }
}

/// Notification display durations
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_success_ms")]
    pub success_ms: u64,

    #[serde(default = "default_error_ms")]
    pub error_ms: u64,

    #[serde(default = "default_info_ms")]
    pub info_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            success_ms: default_success_ms(),
            error_ms: default_error_ms(),
            info_ms: default_info_ms(),
        }
    }
}

/// Localized user-visible messages (Bengali by default)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub field_required: String,
    pub invalid_email: String,
    pub invalid_phone: String,
    pub invalid_name: String,
    pub form_invalid: String,
    pub challenge_failed: String,
    pub rate_limited: String,
    pub processing: String,
    pub submit_success: String,
    pub submit_failure: String,
    pub submit_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            field_required: "এই ক্ষেত্রটি আবশ্যক".to_string(),
            invalid_email: "সঠিক ইমেইল ঠিকানা দিন".to_string(),
            invalid_phone: "সঠিক ফোন নম্বর দিন (যেমন: 01712345678)".to_string(),
            invalid_name: "শুধুমাত্র বাংলা বা ইংরেজি অক্ষর ব্যবহার করুন".to_string(),
            form_invalid: "দয়া করে সব ক্ষেত্র সঠিকভাবে পূরণ করুন".to_string(),
            challenge_failed: "ক্যাপচার উত্তর সঠিক নয়। আবার চেষ্টা করুন।".to_string(),
            rate_limited: "অনেক বেশি চেষ্টা। পরে আবার চেষ্টা করুন।".to_string(),
            processing: "জমা দেওয়া হচ্ছে...".to_string(),
            submit_success: "আপনার তথ্য সফলভাবে জমা দেওয়া হয়েছে! আমরা শীঘ্রই যোগাযোগ করব।"
                .to_string(),
            submit_failure: "দুঃখিত, একটি সমস্যা হয়েছে। দয়া করে আবার চেষ্টা করুন।".to_string(),
            submit_label: "জমা দিন".to_string(),
        }
    }
}

/// One form served to the page
#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    pub id: String,

    /// Submit control label; falls back to `messages.submit_label`
    #[serde(default)]
    pub submit_label: Option<String>,

    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub name: String,

    #[serde(default = "default_field_kind")]
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,
}

impl FieldConfig {
    fn new(name: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required,
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_storage_path() -> String { DEFAULT_STORAGE_PATH.to_string() }
fn default_honeypot_field() -> String { HONEYPOT_FIELD.to_string() }
fn default_max_submissions() -> usize { MAX_SUBMISSIONS_PER_WINDOW }
fn default_window_secs() -> u64 { SUBMISSION_WINDOW_SECS }
fn default_min_operand() -> i32 { CHALLENGE_MIN_OPERAND }
fn default_max_operand() -> i32 { CHALLENGE_MAX_OPERAND }
fn default_latency_ms() -> u64 { SIMULATED_LATENCY_MS }
fn default_failure_rate() -> f64 { SIMULATED_FAILURE_RATE }
fn default_success_ms() -> u64 { durations::SUCCESS_MS }
fn default_error_ms() -> u64 { durations::ERROR_MS }
fn default_info_ms() -> u64 { durations::INFO_MS }
fn default_field_kind() -> FieldKind { FieldKind::Text }

fn default_forms() -> Vec<FormConfig> {
    vec![
        FormConfig {
            id: "signup-form".to_string(),
            submit_label: None,
            fields: vec![
                FieldConfig::new("name", FieldKind::NameBilingual, true),
                FieldConfig::new("email", FieldKind::Email, true),
                FieldConfig::new("phone", FieldKind::Phone, true),
                FieldConfig::new("role", FieldKind::Text, false),
            ],
        },
        FormConfig {
            id: "volunteer-form".to_string(),
            submit_label: None,
            fields: vec![
                FieldConfig::new("name", FieldKind::NameBilingual, true),
                FieldConfig::new("phone", FieldKind::Phone, true),
                FieldConfig::new("area", FieldKind::Text, true),
                FieldConfig::new("message", FieldKind::Text, false),
            ],
        },
    ]
}

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &crate::cli::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref storage_path) = args.storage_path {
            config.storage_path = storage_path.clone();
        }

        config.validate()?;

        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), RampartError> {
        if self.rate_limit.max_submissions == 0 {
            return Err(RampartError::Config(
                "rate_limit.max_submissions must be at least 1".into(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(RampartError::Config("rate_limit.window_secs must be positive".into()));
        }
        if self.captcha.min_operand > self.captcha.max_operand {
            return Err(RampartError::Config(format!(
                "captcha operand range {}..={} is empty",
                self.captcha.min_operand, self.captcha.max_operand
            )));
        }
        if !(0.0..=1.0).contains(&self.submitter.failure_rate) {
            return Err(RampartError::Config(format!(
                "submitter.failure_rate {} is not a probability",
                self.submitter.failure_rate
            )));
        }
        if self.honeypot_field.trim().is_empty() {
            return Err(RampartError::Config("honeypot_field must not be empty".into()));
        }

        let mut ids = HashSet::new();
        for form in &self.forms {
            if !ids.insert(form.id.as_str()) {
                return Err(RampartError::Config(format!("duplicate form id {}", form.id)));
            }
            let mut names = HashSet::new();
            for field in &form.fields {
                if !names.insert(field.name.as_str()) {
                    return Err(RampartError::Config(format!(
                        "duplicate field {} in form {}",
                        field.name, form.id
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            storage_path: default_storage_path(),
            honeypot_field: default_honeypot_field(),
            rate_limit: RateLimitConfig::default(),
            captcha: CaptchaConfig::default(),
            submitter: SubmitterConfig::default(),
            notifications: NotificationConfig::default(),
            messages: Messages::default(),
            forms: default_forms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.max_submissions, 5);
        assert_eq!(config.rate_limit.window_secs, 3600);
        assert_eq!(config.honeypot_field, "website");
        assert_eq!(config.forms.len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.captcha.min_operand = 11;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.submitter.failure_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.forms.push(config.forms[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_file_with_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
listen_addr = "0.0.0.0:9000"

[rate_limit]
max_submissions = 3

[messages]
processing = "Sending..."

[[forms]]
id = "contact"
fields = [
    {{ name = "email", kind = "email", required = true }},
    {{ name = "note" }},
]
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let args = crate::cli::Args::parse_from(["rampart", "--storage-path", "/tmp/ls.json"]);
        let config = AppConfig::load(&path, &args).unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.storage_path, "/tmp/ls.json");
        assert_eq!(config.rate_limit.max_submissions, 3);
        assert_eq!(config.rate_limit.window_secs, 3600);
        assert_eq!(config.messages.processing, "Sending...");
        assert_eq!(config.messages.submit_label, Messages::default().submit_label);
        assert_eq!(config.forms.len(), 1);
        assert_eq!(config.forms[0].fields[1].kind, FieldKind::Text);
        assert!(!config.forms[0].fields[1].required);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let args = crate::cli::Args::parse_from(["rampart"]);
        let config = AppConfig::load("does/not/exist.toml", &args).unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
    }
}
