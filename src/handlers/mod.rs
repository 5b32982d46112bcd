//! API handlers for the FraudIntel backend

pub mod fraud;
pub mod health;

pub use fraud::analyze_wallet;
pub use health::health_check;
