//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::StoreResult;
use serde::Serialize;
use std::future::Future;
use std::time::Instant;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub primary_store: StoreHealth,
    pub secondary_store: StoreHealth,
}

/// Reachability of one store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness and readiness checks.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn check_store(ping: impl Future<Output = StoreResult<()>>) -> StoreHealth {
    let start = Instant::now();
    let connected = ping.await.is_ok();
    StoreHealth {
        connected,
        latency_ms: connected.then(|| start.elapsed().as_millis() as u64),
    }
}

fn overall_status(primary: &StoreHealth, secondary: &StoreHealth) -> &'static str {
    match (primary.connected, secondary.connected) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        _ => "unhealthy",
    }
}

/// Full health check endpoint.
///
/// The primary store is required to serve traffic. A missing secondary store
/// only degrades the service: team and membership operations keep working.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let primary = check_store(state.stores.users.ping()).await;
    let secondary = check_store(state.stores.presentations.ping()).await;

    if !primary.connected {
        tracing::warn!("Health check failed: primary store unreachable");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse {
        status: overall_status(&primary, &secondary).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        primary_store: primary,
        secondary_store: secondary,
    }))
}

/// Liveness endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness endpoint. Both stores must answer.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let primary = state.stores.users.ping().await.is_ok();
    let secondary = state.stores.presentations.ping().await.is_ok();

    if primary && secondary {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
