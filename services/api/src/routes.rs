use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use solar_subsidy::workflows::applications::{
    application_router, ApplicationLifecycleService, LifecycleStore, NotificationPublisher,
};
use solar_subsidy::workflows::estimator::{calculator_router, CalculatorState, RegionCatalog};
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_service_routes<S, N, C>(
    lifecycle: Arc<ApplicationLifecycleService<S, N>>,
    calculator: Arc<CalculatorState<C>>,
) -> axum::Router
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
    C: RegionCatalog + 'static,
{
    application_router(lifecycle)
        .merge(calculator_router(calculator))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
