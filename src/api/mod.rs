//! Campaign Report REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Reports (require `?api_key=`)
//! - `GET /api/v1/accounts` - Accounts with report links
//! - `GET /api/v1/reports/:account_id` - Campaign performance report
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Status with version and uptime
//! - `GET /ping` - Ping
//!
//! # Example
//!
//! ```rust,ignore
//! use campaign_report::api::{serve, ApiConfig, AppState};
//! use campaign_report::klaviyo::{KlaviyoClient, KlaviyoConfig};
//! use campaign_report::report::ReportBuilder;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let klaviyo = Arc::new(KlaviyoClient::new(KlaviyoConfig::default())?);
//!     let reports = Arc::new(ReportBuilder::new(klaviyo.clone(), Default::default(), Default::default()));
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(klaviyo, reports, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    let api_routes = Router::new()
        .route("/accounts", get(routes::accounts::list_accounts))
        .route("/reports/:account_id", get(routes::reports::get_report))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            auth::require_access_key,
        ));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    Router::new()
        .route("/ping", get(routes::health::ping))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Campaign report API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Campaign report API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
