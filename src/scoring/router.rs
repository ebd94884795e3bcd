use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, InputEntry, RawInputs};
use super::repository::ScorecardRepository;
use super::service::{ScorecardService, ScoringError};

/// Router builder exposing HTTP endpoints for evaluation and input staging.
pub fn scorecard_router<R>(service: Arc<ScorecardService<R>>) -> Router
where
    R: ScorecardRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/scorecards/:scenario/evaluate",
            post(evaluate_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/inputs",
            put(upsert_inputs_handler::<R>).delete(clear_inputs_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/score/:scenario",
            post(score_application_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path(scenario): Path<String>,
    axum::Json(inputs): axum::Json<RawInputs>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    match service.evaluate(&scenario, &inputs) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => scoring_error_response(error),
    }
}

pub(crate) async fn score_application_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path((application_id, scenario)): Path<(String, String)>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.evaluate_application(&scenario, &id) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => scoring_error_response(error),
    }
}

pub(crate) async fn upsert_inputs_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(entries): axum::Json<Vec<InputEntry>>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.record_inputs(&id, entries) {
        Ok(stored) => {
            let payload = json!({ "stored": stored });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => scoring_error_response(error),
    }
}

pub(crate) async fn clear_inputs_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.clear_inputs(&id) {
        Ok(cleared) => {
            let payload = json!({ "cleared": cleared });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => scoring_error_response(error),
    }
}

fn scoring_error_response(error: ScoringError) -> Response {
    match error {
        ScoringError::ScenarioNotFound { name } => {
            let payload = json!({ "error": format!("scenario '{name}' not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
