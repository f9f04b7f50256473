use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use super::intake::ApplicationForm;
use super::service::{AssessmentView, LoanApprovalService};
use crate::error::AppError;

/// Router builder exposing the assessment pipeline and the model's feature schema.
pub fn assessment_router(service: Arc<LoanApprovalService>) -> Router {
    Router::new()
        .route("/api/v1/loan/assessments", post(assess_handler))
        .route("/api/v1/loan/schema", get(schema_handler))
        .with_state(service)
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<LoanApprovalService>>,
    Json(form): Json<ApplicationForm>,
) -> Result<Json<AssessmentView>, AppError> {
    let assessment = service.assess(&form)?;
    Ok(Json(assessment.view(Utc::now())))
}

pub(crate) async fn schema_handler(
    State(service): State<Arc<LoanApprovalService>>,
) -> Json<Value> {
    let features = service.schema().columns();
    Json(json!({
        "count": features.len(),
        "features": features,
    }))
}
