use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{Method, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::files::dtos::{
    FileResponseDto, UploadFileDto, UploadFileResponseDto, UploadedFile, DEFAULT_CONTENT_TYPE,
    FILE_FIELD,
};
use crate::features::files::services::FileService;
use crate::shared::types::{ErrorResponse, MessageResponse};

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file exceeds the size limit".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Ids that are not UUIDs cannot exist, so they are reported as missing
fn parse_file_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("File not found".to_string()))
}

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` part.
#[utoipa::path(
    post,
    path = "/v1/file",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Form with a single `file` part",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = UploadFileResponseDto),
        (status = 400, description = "No file uploaded or invalid file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadFileResponseDto>), AppError> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected non-multipart upload: {}", e);
        AppError::BadRequest("No file uploaded".to_string())
    })?;

    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        if upload.is_some() {
            return Err(AppError::BadRequest(
                "Only one file may be uploaded per request".to_string(),
            ));
        }

        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;

        upload = Some(UploadedFile {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let response = service.upload_file(upload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get file metadata by id
#[utoipa::path(
    get,
    path = "/v1/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileResponseDto),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn get_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<FileResponseDto>, AppError> {
    let id = parse_file_id(&id)?;
    let file = service.get_file(id).await?;
    Ok(Json(file))
}

/// Delete a file and its stored object
#[utoipa::path(
    delete,
    path = "/v1/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_file_id(&id)?;
    service.delete_file(id).await?;
    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// `GET /v1/file` and `DELETE /v1/file` without an id
pub async fn file_id_required(method: Method) -> AppError {
    AppError::BadRequest(format!(
        "{method} /v1/file is not a valid request. Use {method} /v1/file/{{id}} instead."
    ))
}

pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(format!(
        "HTTP {} is not supported on this endpoint.",
        method
    ))
}
