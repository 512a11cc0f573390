use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::features::health::services::HealthService;

/// Empty-bodied response carrying the no-cache headers every probe answer needs
fn probe_response(status: StatusCode) -> Response {
    (
        status,
        [
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
    )
        .into_response()
}

/// Health check
///
/// Pings the database and records the probe. Returns an empty body.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 400, description = "Request carried a body or query parameters"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn perform_health_check(State(service): State<Arc<HealthService>>) -> Response {
    match service.check().await {
        Ok(()) => probe_response(StatusCode::OK),
        Err(e) => probe_response(e.status()),
    }
}

/// Any method other than GET on `/healthz`
///
/// Still pings the database so an outage surfaces as 503 rather than 405.
pub async fn unsupported_method(State(service): State<Arc<HealthService>>) -> Response {
    match service.ensure_reachable().await {
        Ok(()) => probe_response(StatusCode::METHOD_NOT_ALLOWED),
        Err(e) => probe_response(e.status()),
    }
}
