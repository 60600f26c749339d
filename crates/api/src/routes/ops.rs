//! Health and Prometheus metrics endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use super::sessions::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub payments_enabled: bool,
    pub developer_mode: bool,
    pub sessions: usize,
}

/// GET /health: Liveness plus the feature switches the process runs with.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let coordinator = &state.coordinator;
    Json(HealthResponse {
        status: "ok",
        payments_enabled: coordinator.payments_enabled(),
        developer_mode: coordinator.settings().developer_mode,
        sessions: coordinator.repository().len().await,
    })
}

/// GET /metrics: Returns Prometheus-formatted metrics.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
