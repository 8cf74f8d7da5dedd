//! HTTP adapter for Rampart.
//!
//! Maps page intents onto pipeline methods; no rules live here.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rampart_common::{Notification, RampartError};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod forms;
mod health;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/stats", get(health::stats))

        // Forms
        .route("/forms", get(forms::list_forms))
        .route("/forms/{form_id}", get(forms::get_form))
        .route("/forms/{form_id}/fields/{field}/input", post(forms::field_input))
        .route("/forms/{form_id}/fields/{field}/blur", post(forms::field_blur))
        .route("/forms/{form_id}/submit", post(forms::submit_form))

        // Snackbar
        .route("/notification", get(current_notification).delete(dismiss_notification))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response wrapper
pub struct ApiError(RampartError);

impl From<RampartError> for ApiError {
    fn from(err: RampartError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }

        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

// === Snackbar Handlers ===

async fn current_notification(State(state): State<AppState>) -> Json<Option<Notification>> {
    Json(state.snackbar.current())
}

async fn dismiss_notification(State(state): State<AppState>) -> StatusCode {
    state.snackbar.dismiss();
    StatusCode::NO_CONTENT
}
