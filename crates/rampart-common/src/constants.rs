//! Shared constants for Rampart components.

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8890";

/// Default path of the durable key-value store
pub const DEFAULT_STORAGE_PATH: &str = "data/local-storage.json";

/// Accepted submissions allowed inside one window
pub const MAX_SUBMISSIONS_PER_WINDOW: usize = 5;

/// Submission window in seconds (1 hour)
pub const SUBMISSION_WINDOW_SECS: u64 = 3600;

/// Smallest challenge operand
pub const CHALLENGE_MIN_OPERAND: i32 = 1;

/// Largest challenge operand
pub const CHALLENGE_MAX_OPERAND: i32 = 10;

/// Name of the hidden honeypot field added to every form
pub const HONEYPOT_FIELD: &str = "website";

/// Simulated collaborator latency in milliseconds
pub const SIMULATED_LATENCY_MS: u64 = 2000;

/// Probability that the simulated collaborator fails
pub const SIMULATED_FAILURE_RATE: f64 = 0.1;

/// Notification display durations
pub mod durations {
    /// Success notifications (ms)
    pub const SUCCESS_MS: u64 = 5000;

    /// Error notifications (ms)
    pub const ERROR_MS: u64 = 4000;

    /// Generic/info notifications (ms)
    pub const INFO_MS: u64 = 3000;
}

/// Durable local storage keys
pub mod storage_keys {
    /// Theme flag ("light" or "dark"), reserved for the page shell
    pub const THEME: &str = "theme";

    /// JSON array of accepted submission timestamps (ms since epoch)
    pub const FORM_SUBMISSIONS: &str = "formSubmissions";
}
