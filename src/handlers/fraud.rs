//! Fraud analysis API handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::error::ApiError;
use crate::models::fraud::{AnalyzeRequest, FraudAssessment};
use crate::services::FraudDetectionService;

/// POST /v1/analyze - Score one wallet from its observed transactions
pub async fn analyze_wallet(
    State(fraud_service): State<Arc<FraudDetectionService>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<FraudAssessment>, ApiError> {
    payload.validate()?;

    // Graph iteration and the outlier fit are CPU-bound; keep them off the
    // async workers so one large request cannot stall unrelated ones.
    let assessment = tokio::task::spawn_blocking(move || fraud_service.analyze(&payload))
        .await
        .map_err(|e| ApiError::InternalError(format!("scoring task failed: {}", e)))?;

    Ok(Json(assessment))
}
