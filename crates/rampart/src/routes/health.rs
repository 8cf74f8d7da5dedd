//! Health check endpoints.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::limiter::RateLimitStatus;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct StatsResponse {
    forms: usize,
    uptime_secs: u64,
    rate_limit: RateLimitStatus,
    throttled: bool,
}

/// Submission window usage
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut pipeline = state.pipeline.lock().await;
    let rate_limit = pipeline.refresh_rate_limit().with_pending(pipeline.in_flight());

    Json(StatsResponse {
        forms: pipeline.form_ids().len(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        throttled: rate_limit.is_throttled(),
        rate_limit,
    })
}
