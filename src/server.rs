//! HTTP server exposing the enrichment endpoint.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/enrich` | Enrich a company website |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! The enrichment endpoint returns exactly two error shapes:
//!
//! ```json
//! { "error": "Website URL is required" }        // 400, missing field
//! { "error": "Failed to enrich company data" }  // 500, unanticipated
//! ```
//!
//! Every recoverable upstream failure (fetch error, timeout, missing
//! credential, completion API failure, malformed model output) is converted
//! into a best-effort substitute response with HTTP 200 — callers always
//! receive a well-formed enrichment object or one of the two errors above.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! dashboard clients.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::enrich::Enricher;

/// Shared application state passed to route handlers.
#[derive(Clone)]
struct AppState {
    enricher: Arc<Enricher>,
}

/// Build the application router.
///
/// Separated from [`run_server`] so tests can serve it on an ephemeral
/// port.
pub fn router(config: &Config) -> anyhow::Result<Router> {
    let state = AppState {
        enricher: Arc::new(Enricher::from_env(&config.enrichment)?),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/api/enrich", post(handle_enrich))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state))
}

/// Start the HTTP server on the configured bind address.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let app = router(config)?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("enrichment server listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

// ============ POST /api/enrich ============

#[derive(Deserialize)]
struct EnrichRequest {
    #[serde(default)]
    website: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

async fn handle_enrich(
    State(state): State<AppState>,
    Json(req): Json<EnrichRequest>,
) -> Response {
    let website = match req.website.as_deref().map(str::trim) {
        Some(w) if !w.is_empty() => w.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "Website URL is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.enricher.enrich(&website).await {
        Ok(outcome) => Json(outcome.into_result()).into_response(),
        Err(e) => {
            error!(website, error = %e, "enrichment failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Failed to enrich company data".to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
