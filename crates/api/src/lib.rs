//! HTTP adapter for the cake order assistant.
//!
//! Stands in for the chat transport: customer inputs and payment provider
//! callbacks arrive as REST calls and are routed into the checkout
//! coordinator. Ships with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CheckoutCoordinator, CheckoutSettings, InMemoryNotificationService, InMemoryPaymentService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::sessions::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health))
        .route("/prices", get(routes::catalog::list))
        .route("/sessions/{id}", get(routes::sessions::get))
        .route("/sessions/{id}/messages", post(routes::sessions::post_message))
        .route(
            "/sessions/{id}/payments/pre-checkout",
            post(routes::payments::pre_checkout),
        )
        .route(
            "/sessions/{id}/payments/success",
            post(routes::payments::success),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with in-process collaborators.
///
/// Online payment is only wired up when a provider token is configured.
pub fn create_default_state(config: &Config) -> Arc<AppState> {
    let payment = config.payments_enabled().then(InMemoryPaymentService::new);
    let notifications = InMemoryNotificationService::new(config.operator_chat_id);
    let settings = CheckoutSettings {
        developer_mode: config.developer_mode,
        session_ttl: config.session_ttl,
    };

    let coordinator = CheckoutCoordinator::new(payment.clone(), notifications.clone(), settings);

    Arc::new(AppState {
        coordinator,
        payment,
        notifications,
    })
}

/// Spawns a task that cancels abandoned orders every `period`.
pub fn spawn_session_reaper(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let purged = state.coordinator.purge_expired().await;
            if purged > 0 {
                tracing::info!(purged, "expired abandoned orders");
            }
        }
    })
}
