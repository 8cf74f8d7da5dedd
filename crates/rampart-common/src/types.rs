//! Core types shared across Rampart components.

use serde::{Deserialize, Serialize};

/// How a form field's value is checked.
///
/// `required` is tracked separately on the field, so any kind may be
/// mandatory or optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Free text, no format rule
    #[serde(alias = "required-text")]
    Text,
    /// `local@domain.tld`
    Email,
    /// Local 11-digit mobile number, optional `+88`
    Phone,
    /// Bengali-only or Latin-only personal name
    NameBilingual,
    /// Hidden anti-bot field, never shown to people
    Honeypot,
}

impl FieldKind {
    /// Hidden fields are excluded from the rendered form and the payload
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Honeypot)
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

/// A transient, auto-dismissing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    /// How long the message stays visible
    pub duration_ms: u64,
    /// When it was shown (ms since epoch)
    pub shown_at: i64,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, duration_ms: u64) -> Self {
        Self {
            message: message.into(),
            severity,
            duration_ms,
            shown_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Returns true once the display duration has elapsed at `now_ms`
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.shown_at) >= self.duration_ms as i64
    }
}

/// Arithmetic challenge operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    /// Symbol used when rendering the question
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
        }
    }

    pub fn apply(&self, lhs: i32, rhs: i32) -> i32 {
        match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
        }
    }
}

/// Submission pipeline states.
///
/// `Idle → Validating → (Rejected | CheckingChallenge) →
/// (ChallengeFailed | RateLimited | Submitting) → (Succeeded | Failed) → Idle`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    Validating,
    Rejected,
    CheckingChallenge,
    ChallengeFailed,
    RateLimited,
    Submitting,
    Succeeded,
    Failed,
}

/// Terminal result of one submit intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Collaborator accepted the submission
    Succeeded,
    /// Collaborator rejected the submission, input kept
    Failed,
    /// One or more fields failed validation
    Rejected,
    /// Wrong or stale challenge answer
    ChallengeFailed,
    /// Too many accepted submissions in the window
    RateLimited,
    /// Honeypot tripped, silently discarded
    Dropped,
    /// Submit control disabled (in flight or throttled)
    Blocked,
}
