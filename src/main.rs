//! FraudIntel Backend Server
//!
//! Multi-chain fraud intelligence API: scores wallet addresses for fraud
//! risk from observed transactions across Ethereum, BSC, and Polygon, and
//! runs the ingestion consumer for the fraud event stream.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use fraudintel_server::chains::MultiChainRpcClient;
use fraudintel_server::config::Config;
use fraudintel_server::ingestion::{run_ingestion_loop, FraudEventStream};
use fraudintel_server::middleware;
use fraudintel_server::middleware::RateLimiter;
use fraudintel_server::routes;
use fraudintel_server::services::FraudDetectionService;
use fraudintel_server::state::AppState;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        environment = %config.environment.as_str(),
        "Starting FraudIntel backend"
    );

    // The scoring engine is stateless and shared across all requests
    let fraud_service = Arc::new(FraudDetectionService::default());

    // Chain RPC client for the ingestion path
    let rpc_client = Arc::new(MultiChainRpcClient::new(config.rpc_endpoints()));

    // Fraud event stream consumer runs for the whole process lifetime
    let event_stream = match FraudEventStream::new(&config.redis_url, &config.stream_name) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Failed to configure event stream: {}", e);
            std::process::exit(1);
        }
    };
    tokio::spawn(run_ingestion_loop(event_stream, rpc_client.clone()));

    let app_state = AppState::new(fraud_service);

    // Initialize rate limiter (requests per second per client)
    let rate_limiter = RateLimiter::new(config.rate_limit_rps);

    // Create the app router
    let app = Router::new()
        .route("/", get(root))
        .merge(routes::fraud_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            middleware::rate_limit_layer(limiter)(req, next)
        }))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/v1/health", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind {}", addr);
            std::process::exit(1);
        }
    };

    // Serve with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

async fn root() -> &'static str {
    "FraudIntel API Server"
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed_origins = config.cors_allowed_origins.clone().unwrap_or_default();

    if allowed_origins.is_empty() {
        tracing::warn!("MFI_CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
