//! FraudIntel Backend Library
//!
//! This library exports the core modules for the multi-chain fraud
//! intelligence backend server.

pub mod chains;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ingestion;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
