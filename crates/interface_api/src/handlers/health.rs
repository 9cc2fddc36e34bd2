//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use core_kernel::HealthCheckable;

use crate::dto::DataResponse;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct PingResponse {
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub uptime: String,
}

/// Service banner with start time and uptime
pub async fn ping(State(state): State<AppState>) -> Json<DataResponse<PingResponse>> {
    let now = state.engine.clock().now();
    Json(DataResponse::new(PingResponse {
        status: "up".to_string(),
        started_at: state.started_at,
        uptime: format_uptime(now - state.started_at),
    }))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes the ledger store)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let health = state.store.health_check().await;
    if !health.is_operational() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Formats a duration as `1d2h3m4s`, omitting leading zero units
///
/// Seconds are always present. Negative durations format as `0s`.
pub fn format_uptime(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds().max(0);
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}
