//! Submission throttling.
//!
//! Tracks accepted submissions in durable storage and blocks new ones once
//! the trailing window is full.

mod log;

pub use log::{RateLimitStatus, SubmissionLog};

/// Wall-clock source in milliseconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Real time via chrono
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Hand-driven clock for tests
    #[derive(Debug, Default)]
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(ms: i64) -> Self {
            Self(AtomicI64::new(ms))
        }

        pub fn advance(&self, ms: i64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }

        pub fn set_to(&self, ms: i64) {
            self.0.store(ms, Ordering::SeqCst);
        }
    }

    impl super::Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
