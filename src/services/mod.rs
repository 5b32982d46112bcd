//! Business logic services for the FraudIntel backend

pub mod anomaly;
pub mod fraud_detection;
pub mod graph_engine;

pub use fraud_detection::FraudDetectionService;

/// Round to the 4-decimal score precision used across the engine
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
