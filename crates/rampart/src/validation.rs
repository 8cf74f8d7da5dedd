//! Form field validation.
//!
//! Rules, checked against the trimmed value:
//! - Required fields must be non-empty
//! - Email: `local@domain.tld`, no whitespace, one `@`
//! - Phone: `01[3-9]` followed by 8 digits, optional `+88` prefix
//! - Bilingual name: Bengali letters or Latin letters, never mixed

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use crate::config::Messages;
use rampart_common::FieldKind;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+88)?01[3-9][0-9]{8}$").expect("valid phone regex"));

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\u{0980}-\u{09FF}\s]+$|^[a-zA-Z\s]+$").expect("valid name regex")
});

/// Field validation error types.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("field required")]
    Required,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhone,

    #[error("name mixes scripts or contains symbols")]
    InvalidName,
}

/// Result of validating one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(FieldError),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn error(&self) -> Option<FieldError> {
        match self {
            Validity::Valid => None,
            Validity::Invalid(e) => Some(*e),
        }
    }
}

/// Apply the rules for `kind` to a raw value
pub fn check_value(kind: FieldKind, required: bool, value: &str) -> Validity {
    let value = value.trim();

    if value.is_empty() {
        return if required && !kind.is_hidden() {
            Validity::Invalid(FieldError::Required)
        } else {
            Validity::Valid
        };
    }

    let ok = match kind {
        FieldKind::Text | FieldKind::Honeypot => true,
        FieldKind::Email => EMAIL_RE.is_match(value),
        FieldKind::Phone => PHONE_RE.is_match(value),
        FieldKind::NameBilingual => NAME_RE.is_match(value),
    };

    if ok {
        Validity::Valid
    } else {
        Validity::Invalid(match kind {
            FieldKind::Email => FieldError::InvalidEmail,
            FieldKind::Phone => FieldError::InvalidPhone,
            _ => FieldError::InvalidName,
        })
    }
}

/// Validator producing localized messages.
pub struct FieldValidator {
    messages: Messages,
}

impl FieldValidator {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    /// Validate a value, returning the localized inline message on failure
    pub fn validate(&self, name: &str, kind: FieldKind, required: bool, value: &str) -> Option<String> {
        match check_value(kind, required, value) {
            Validity::Valid => None,
            Validity::Invalid(error) => {
                debug!(field = %name, ?kind, %error, "Field invalid");
                Some(self.message(error).to_string())
            }
        }
    }

    pub fn message(&self, error: FieldError) -> &str {
        match error {
            FieldError::Required => &self.messages.field_required,
            FieldError::InvalidEmail => &self.messages.invalid_email,
            FieldError::InvalidPhone => &self.messages.invalid_phone,
            FieldError::InvalidName => &self.messages.invalid_name,
        }
    }
}
