//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::services::FraudDetectionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub fraud_service: Arc<FraudDetectionService>,
}

impl AppState {
    pub fn new(fraud_service: Arc<FraudDetectionService>) -> Self {
        Self { fraud_service }
    }
}

impl FromRef<AppState> for Arc<FraudDetectionService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.fraud_service.clone()
    }
}
