//! Submission collaborator.
//!
//! The pipeline hands validated payloads to an injected [`Submitter`] and
//! awaits exactly one result per dispatch. No retries, no timeout.

use futures::FutureExt;
use futures::future::BoxFuture;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Field name → trimmed value, honeypot excluded
pub type Payload = BTreeMap<String, String>;

/// Collaborator failure
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The receiving end refused the submission
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// The submission never reached the receiving end
    #[error("Submission transport failed: {0}")]
    Transport(String),
}

/// Collaborator acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub message: String,
}

/// Asynchronous submission capability
pub trait Submitter: Send + Sync {
    fn submit<'a>(
        &'a self,
        form_id: &'a str,
        payload: &'a Payload,
    ) -> BoxFuture<'a, Result<Receipt, SubmitError>>;
}

/// Stand-in endpoint: waits, then succeeds or fails at random
pub struct SimulatedSubmitter {
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedSubmitter {
    pub fn new(latency_ms: u64, failure_rate: f64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit<'a>(
        &'a self,
        form_id: &'a str,
        payload: &'a Payload,
    ) -> BoxFuture<'a, Result<Receipt, SubmitError>> {
        async move {
            tracing::debug!(
                form_id = %form_id,
                fields = payload.len(),
                latency_ms = self.latency.as_millis() as u64,
                "Simulating submission"
            );

            tokio::time::sleep(self.latency).await;

            let roll: f64 = rand::rng().random();
            if roll < self.failure_rate {
                Err(SubmitError::Transport("Submission failed".to_string()))
            } else {
                Ok(Receipt {
                    message: "Form submitted successfully".to_string(),
                })
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Payload {
        Payload::from([("name".to_string(), "Rahim".to_string())])
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_fails_at_zero_rate() {
        let submitter = SimulatedSubmitter::new(2000, 0.0);
        for _ in 0..20 {
            assert!(submitter.submit("signup-form", &payload()).await.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_fails_at_full_rate() {
        let submitter = SimulatedSubmitter::new(10, 1.0);
        let err = submitter.submit("signup-form", &payload()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_latency() {
        let submitter = SimulatedSubmitter::new(2000, 0.0);
        let start = tokio::time::Instant::now();
        submitter.submit("signup-form", &payload()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[test]
    fn test_zero_latency_receipt() {
        let submitter = SimulatedSubmitter::new(0, 0.0);
        let receipt = tokio_test::block_on(submitter.submit("volunteer-form", &payload())).unwrap();
        assert_eq!(receipt.message, "Form submitted successfully");
    }
}
