use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::File;

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// Content type assumed when the multipart part does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// A file received from the client, validated before it is stored
#[derive(Debug, Validate)]
pub struct UploadedFile {
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub file_name: String,
    #[validate(length(min = 1, max = 255, message = "File type must be 1-255 characters"))]
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Response DTO for a completed upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileResponseDto {
    /// Unique identifier for the file
    pub id: Uuid,
    /// Original filename as uploaded
    #[schema(example = "report.pdf")]
    pub file_name: String,
    /// Location of the stored object
    pub s3_path: String,
}

/// Response DTO for file metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponseDto {
    pub id: Uuid,
    pub file_name: String,
    pub s3_path: String,
    /// MIME type of the file
    pub file_type: String,
    /// Size of the file in bytes
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<File> for FileResponseDto {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            file_name: file.file_name,
            s3_path: file.s3_path,
            file_type: file.file_type,
            file_size: file.file_size,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

impl From<File> for UploadFileResponseDto {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            file_name: file.file_name,
            s3_path: file.s3_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(file_name: &str, content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_uploaded_file_validation() {
        assert!(uploaded("notes.txt", "text/plain").validate().is_ok());
        assert!(uploaded("", "text/plain").validate().is_err());
        assert!(uploaded(&"a".repeat(256), "text/plain").validate().is_err());
        assert!(uploaded("notes.txt", "").validate().is_err());
    }

    #[test]
    fn test_file_response_uses_camel_case() {
        let now = Utc::now();
        let dto = FileResponseDto::from(File {
            id: Uuid::new_v4(),
            file_name: "notes.txt".to_string(),
            s3_path: "http://localhost:9000/bucket/uploads/x-notes.txt".to_string(),
            file_type: "text/plain".to_string(),
            file_size: 5,
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["fileName"], "notes.txt");
        assert_eq!(json["fileType"], "text/plain");
        assert_eq!(json["fileSize"], 5);
        assert!(json.get("s3Path").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
