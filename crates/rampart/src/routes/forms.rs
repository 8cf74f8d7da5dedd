//! Form intents: view, field input/blur, submit.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rampart_common::RampartError;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::pipeline::{Begin, FieldReport, FormView, SubmitReport, SubmitRequest};
use crate::state::AppState;

#[derive(Serialize)]
pub struct FormsResponse {
    forms: Vec<String>,
}

/// List configured forms
pub async fn list_forms(State(state): State<AppState>) -> Json<FormsResponse> {
    let pipeline = state.pipeline.lock().await;
    Json(FormsResponse {
        forms: pipeline.form_ids(),
    })
}

/// Render a form (re-checks the rate limit)
pub async fn get_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<FormView>, ApiError> {
    let mut pipeline = state.pipeline.lock().await;
    Ok(Json(pipeline.view(&form_id)?))
}

#[derive(Deserialize)]
pub struct FieldInput {
    #[serde(default)]
    value: String,
}

/// Field value changed
pub async fn field_input(
    State(state): State<AppState>,
    Path((form_id, field)): Path<(String, String)>,
    Json(payload): Json<FieldInput>,
) -> Result<StatusCode, ApiError> {
    let mut pipeline = state.pipeline.lock().await;
    pipeline.on_input(&form_id, &field, payload.value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Field lost focus
pub async fn field_blur(
    State(state): State<AppState>,
    Path((form_id, field)): Path<(String, String)>,
) -> Result<Json<FieldReport>, ApiError> {
    let mut pipeline = state.pipeline.lock().await;
    Ok(Json(pipeline.on_blur(&form_id, &field)?))
}

/// Submit a form.
///
/// The pipeline guard is released while the collaborator runs, so views and
/// other forms stay responsive; the form's own control is disabled until
/// the dispatch completes. The dispatch runs on its own task and completes
/// even if the client goes away.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitReport>, ApiError> {
    let begin = state.pipeline.lock().await.begin(&form_id, request)?;

    let report = match begin {
        Begin::Finished(report) => report,
        Begin::Dispatched(dispatch) => {
            let pipeline = state.pipeline.clone();
            tokio::spawn(async move {
                let result = dispatch.send().await;
                pipeline.lock().await.complete(dispatch, result)
            })
            .await
            .map_err(|e| RampartError::Internal(format!("submission task failed: {e}")))??
        }
    };

    tracing::debug!(form_id = %form_id, outcome = ?report.outcome, "Submit intent handled");

    Ok(Json(report))
}
