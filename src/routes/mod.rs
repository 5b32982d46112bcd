//! Route definitions for the FraudIntel API

mod fraud;

pub use fraud::fraud_routes;
