//! Sliding-window submission log backed by the local store.

use rampart_common::RampartError;
use rampart_common::constants::storage_keys::FORM_SUBMISSIONS;
use serde::Serialize;

use crate::storage::KeyValueStore;

/// Outcome of a rate-limit evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    /// Accepted submissions still inside the window
    pub count: usize,
    pub limit: usize,
    /// Dispatched submissions still waiting on their result
    pub pending: usize,
    /// Milliseconds until the oldest record ages out (0 when the window has room)
    pub retry_after_ms: i64,
}

impl RateLimitStatus {
    /// In-flight dispatches hold a slot until they resolve
    pub fn is_throttled(&self) -> bool {
        self.count + self.pending >= self.limit
    }

    pub fn with_pending(self, pending: usize) -> Self {
        Self { pending, ..self }
    }
}

/// Submission log service
pub struct SubmissionLog {
    /// Accepted submissions allowed per window
    max_submissions: usize,
    /// Window length in milliseconds
    window_ms: i64,
}

impl SubmissionLog {
    pub fn new(max_submissions: usize, window_secs: u64) -> Self {
        Self {
            max_submissions,
            window_ms: i64::try_from(window_secs).unwrap_or(i64::MAX).saturating_mul(1000),
        }
    }

    /// Raw timestamps as stored; absent or malformed reads as empty
    fn read(&self, store: &dyn KeyValueStore) -> Vec<i64> {
        let Some(raw) = store.get(FORM_SUBMISSIONS) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(timestamps) => timestamps,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding malformed submission log");
                Vec::new()
            }
        }
    }

    fn write(&self, store: &mut dyn KeyValueStore, timestamps: &[i64]) -> Result<(), RampartError> {
        let data = serde_json::to_string(timestamps)
            .map_err(|e| RampartError::Storage(e.to_string()))?;
        store.set(FORM_SUBMISSIONS, data)
    }

    /// Read, drop records older than the window, persist what is left.
    ///
    /// Records dated after `now_ms` cannot come from this log and are
    /// dropped too. Idempotent for a fixed `now_ms`.
    pub fn prune(&self, store: &mut dyn KeyValueStore, now_ms: i64) -> Vec<i64> {
        let mut timestamps = self.read(store);
        timestamps.retain(|&t| t <= now_ms && now_ms.saturating_sub(t) < self.window_ms);

        if let Err(e) = self.write(store, &timestamps) {
            tracing::warn!(error = %e, "Failed to persist pruned submission log");
        }

        timestamps
    }

    /// Prune, then report whether another submission is allowed
    pub fn evaluate(&self, store: &mut dyn KeyValueStore, now_ms: i64) -> RateLimitStatus {
        let timestamps = self.prune(store, now_ms);
        let count = timestamps.len();

        let retry_after_ms = if count >= self.max_submissions {
            timestamps
                .iter()
                .min()
                .map(|oldest| oldest.saturating_add(self.window_ms).saturating_sub(now_ms).max(0))
                .unwrap_or(0)
        } else {
            0
        };

        RateLimitStatus {
            count,
            limit: self.max_submissions,
            pending: 0,
            retry_after_ms,
        }
    }

    /// Append an accepted submission at `now_ms`
    pub fn record(&self, store: &mut dyn KeyValueStore, now_ms: i64) -> Result<usize, RampartError> {
        let mut timestamps = self.prune(store, now_ms);
        timestamps.push(now_ms);
        self.write(store, &timestamps)?;

        tracing::debug!(count = timestamps.len(), "Recorded accepted submission");

        Ok(timestamps.len())
    }
}
