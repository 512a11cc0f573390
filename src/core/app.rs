use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;

use crate::core::error::AppError;
use crate::core::metrics::Metrics;
use crate::core::middleware;
use crate::core::openapi::ApiDoc;
use crate::features::files::{routes as files_routes, FileService};
use crate::features::health::{routes as health_routes, HealthService};

/// Body size limits enforced by the router
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    /// Largest accepted file upload, in bytes
    pub max_upload_size: usize,
    /// Largest body buffered for request validation, in bytes
    pub max_request_body_size: usize,
}

/// Everything the router needs, already constructed
pub struct AppServices {
    pub file_service: Arc<FileService>,
    pub health_service: Arc<HealthService>,
    pub metrics: Arc<Metrics>,
    pub limits: RequestLimits,
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Build the application router with all middleware applied
pub fn build_router(services: AppServices) -> Router {
    Router::new()
        .merge(files_routes(
            services.file_service,
            services.limits.max_upload_size,
        ))
        .merge(health_routes(services.health_service))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(route_not_found)
        .layer(from_fn_with_state(
            services.limits,
            middleware::validate_request,
        ))
        .layer(from_fn_with_state(
            services.metrics,
            middleware::track_api_metrics,
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
