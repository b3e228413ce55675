use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::classifier::Classifier;
use super::domain::RawApplication;
use super::interpreter::Verdict;
use super::normalizer::IntakeError;
use super::service::{LoanApprovalService, LoanServiceError};

/// Router builder exposing HTTP endpoints for loan assessments and schema audits.
pub fn loan_router<C>(service: Arc<LoanApprovalService<C>>) -> Router
where
    C: Classifier + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/loan/assessments", post(assess_handler::<C>))
        .route("/api/v1/loan/schema", get(schema_handler::<C>))
        .with_state(service)
}

pub(crate) async fn assess_handler<C>(
    State(service): State<Arc<LoanApprovalService<C>>>,
    axum::Json(raw): axum::Json<RawApplication>,
) -> Response
where
    C: Classifier + ?Sized + 'static,
{
    match service.assess(&raw) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(LoanServiceError::Intake(IntakeError::Incomplete(incomplete))) => {
            let warning = Verdict::IncompleteInput {
                missing: incomplete.missing.clone(),
            };
            let payload = json!({
                "outcome": warning.label(),
                "warning": warning.message(),
                "missing": incomplete.missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(LoanServiceError::Intake(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(LoanServiceError::Prediction(error)) => {
            let payload = json!({
                "error": "classifier could not score this submission",
                "detail": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn schema_handler<C>(
    State(service): State<Arc<LoanApprovalService<C>>>,
) -> Response
where
    C: Classifier + ?Sized + 'static,
{
    (StatusCode::OK, axum::Json(service.schema())).into_response()
}
