use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::connection::SimpleConnection;
use std::sync::Arc;

use incollege_shared::clients::db::spawn_read;
use incollege_shared::{AppError, HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// Liveness plus a round trip to the database.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let database = spawn_read(&state.db, |conn| conn.batch_execute("SELECT 1").map_err(AppError::from)).await;
    let response = HealthResponse::from_checks(
        "incollege-api",
        env!("CARGO_PKG_VERSION"),
        vec![HealthCheck::from_result("database", database)],
    );

    let status = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(response)).into_response()
}

/// Prometheus text exposition; empty when no recorder is installed.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
