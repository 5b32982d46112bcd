//! Middleware for the FraudIntel API
//!
//! Provides request tracing, per-client rate limiting, and security headers.

mod rate_limiter;
mod security;
mod tracing;

pub use rate_limiter::{rate_limit_layer, RateLimiter};
pub use security::security_headers;
pub use tracing::request_tracing;
