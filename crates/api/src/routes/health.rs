use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Service banner returned by `GET /`.
#[derive(Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub env: String,
}

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// Readiness response payload.
#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the search engine is reachable.
    pub search_healthy: bool,
}

/// GET / -- service name and environment.
async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME"),
        env: state.config.env.clone(),
    })
}

/// GET /health -- liveness only; never touches dependencies.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready -- 503 unless both the database and the search engine respond.
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (db, search) = tokio::join!(
        terraforge_db::health_check(&state.pool),
        state.search.health(),
    );

    if let Err(e) = &db {
        tracing::warn!(error = %e, "Readiness: database check failed");
    }
    if let Err(e) = &search {
        tracing::warn!(error = %e, "Readiness: search check failed");
    }

    let db_healthy = db.is_ok();
    let search_healthy = search.is_ok();
    let (status_code, status) = if db_healthy && search_healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status_code,
        Json(ReadyResponse {
            status,
            db_healthy,
            search_healthy,
        }),
    )
}

/// Mount health check routes (intended for root-level, NOT under `/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
}
