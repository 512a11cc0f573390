use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::sync::Arc;

use crate::features::files::handlers::{
    delete_file, file_id_required, get_file, method_not_allowed, upload_file,
};
use crate::features::files::services::FileService;

/// Slack on top of the file size for multipart boundaries and part headers
const MULTIPART_OVERHEAD: usize = 16 * 1024;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/v1/file",
            post(upload_file)
                .layer(DefaultBodyLimit::max(
                    max_upload_size.saturating_add(MULTIPART_OVERHEAD),
                ))
                .get(file_id_required)
                .delete(file_id_required)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/v1/file/{id}",
            get(get_file)
                .delete(delete_file)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .with_state(file_service)
}
