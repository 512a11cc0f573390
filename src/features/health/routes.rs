use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::health::handlers::{perform_health_check, unsupported_method};
use crate::features::health::services::HealthService;

/// Create routes for the health feature
pub fn routes(health_service: Arc<HealthService>) -> Router {
    Router::new()
        .route(
            "/healthz",
            get(perform_health_check)
                .head(unsupported_method)
                .fallback(unsupported_method),
        )
        .with_state(health_service)
}
