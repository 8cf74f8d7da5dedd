//! Application state and shared resources.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::limiter::SystemClock;
use crate::notify::Snackbar;
use crate::pipeline::Pipeline;
use crate::storage::KeyValueStore;
use crate::submitter::SimulatedSubmitter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The page's submission pipeline (single owner, guarded for the adapter)
    pub pipeline: Arc<Mutex<Pipeline>>,

    /// Notification surface the pipeline writes to
    pub snackbar: Arc<Snackbar>,

    pub started_at: Instant,
}

impl AppState {
    /// Wire the pipeline to the simulated collaborator and the system clock
    pub fn new(config: &AppConfig, store: Box<dyn KeyValueStore>) -> Self {
        let snackbar = Arc::new(Snackbar::new());
        let submitter = Arc::new(SimulatedSubmitter::new(
            config.submitter.latency_ms,
            config.submitter.failure_rate,
        ));

        let pipeline = Pipeline::new(
            config,
            store,
            submitter,
            snackbar.clone(),
            Arc::new(SystemClock),
        );

        Self::from_parts(pipeline, snackbar)
    }

    pub fn from_parts(pipeline: Pipeline, snackbar: Arc<Snackbar>) -> Self {
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            snackbar,
            started_at: Instant::now(),
        }
    }
}
