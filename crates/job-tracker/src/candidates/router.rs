use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{CandidateDraft, CandidateId, StageUpdate};
use super::repository::CandidateRepository;
use super::service::{CandidateService, CandidateServiceError};

/// Router builder exposing the candidate and analytics endpoints.
pub fn candidate_router<R>(service: Arc<CandidateService<R>>) -> Router
where
    R: CandidateRepository + 'static,
{
    Router::new()
        .route(
            "/api/candidates",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/candidates/:id", put(update_stage_handler::<R>))
        .route("/api/analytics/stages", get(stage_analytics_handler::<R>))
        .with_state(service)
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<CandidateService<R>>>) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.list().await {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(err) => server_error("list candidates", err),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CandidateService<R>>>,
    axum::Json(draft): axum::Json<CandidateDraft>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.create(draft).await {
        Ok(candidate) => (StatusCode::CREATED, axum::Json(candidate)).into_response(),
        Err(err) => server_error("create candidate", err),
    }
}

pub(crate) async fn update_stage_handler<R>(
    State(service): State<Arc<CandidateService<R>>>,
    Path(id): Path<String>,
    axum::Json(update): axum::Json<StageUpdate>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    let id = CandidateId(id);
    match service.update_stage(&id, update).await {
        Ok(candidate) => (StatusCode::OK, axum::Json(candidate)).into_response(),
        Err(err) if err.is_not_found() => {
            let payload = json!({ "msg": "Candidate not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => server_error("update candidate stage", err),
    }
}

pub(crate) async fn stage_analytics_handler<R>(
    State(service): State<Arc<CandidateService<R>>>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.stage_analytics().await {
        Ok(counts) => (StatusCode::OK, axum::Json(counts)).into_response(),
        Err(err) => server_error("aggregate stages", err),
    }
}

// Validation and store failures share one generic 500 response.
fn server_error(operation: &'static str, err: CandidateServiceError) -> Response {
    error!(operation, error = %err, "candidate request failed");
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
