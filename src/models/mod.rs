//! Data models for the FraudIntel backend

pub mod fraud;

pub use fraud::*;
