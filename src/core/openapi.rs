use utoipa::OpenApi;

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::health::handlers as health_handlers;
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::upload_file,
        files_handlers::get_file,
        files_handlers::delete_file,
        // Health
        health_handlers::perform_health_check,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            MessageResponse,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::UploadFileResponseDto,
            files_dtos::FileResponseDto,
        )
    ),
    tags(
        (name = "files", description = "File upload and metadata"),
        (name = "health", description = "Liveness and database reachability"),
    ),
    info(
        title = "File Upload Service API",
        version = "0.1.0",
        description = "Stores uploaded files in S3 and their metadata in Postgres",
    )
)]
pub struct ApiDoc;
