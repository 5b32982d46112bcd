//! Fraud analysis route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{analyze_wallet, health_check};
use crate::state::AppState;

pub fn fraud_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/analyze", post(analyze_wallet))
        .route("/v1/health", get(health_check))
}
