use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::metrics::{MetricUnit, Metrics};
use crate::features::files::dtos::{FileResponseDto, UploadFileResponseDto, UploadedFile};
use crate::features::files::models::NewFile;
use crate::features::files::services::FileRepository;
use crate::modules::storage::ObjectStorage;
use crate::shared::validation::sanitize_object_name;

/// Service for file operations
pub struct FileService {
    repository: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStorage>,
    metrics: Arc<Metrics>,
    key_prefix: String,
    max_upload_size: usize,
}

impl FileService {
    pub fn new(
        repository: Arc<dyn FileRepository>,
        storage: Arc<dyn ObjectStorage>,
        metrics: Arc<Metrics>,
        key_prefix: impl Into<String>,
        max_upload_size: usize,
    ) -> Self {
        Self {
            repository,
            storage,
            metrics,
            key_prefix: key_prefix.into(),
            max_upload_size,
        }
    }

    /// Build the object key: `{prefix}/{file_id}-{sanitized name}`
    fn object_key(&self, file_id: Uuid, file_name: &str) -> String {
        let name = sanitize_object_name(file_name);
        if self.key_prefix.is_empty() {
            format!("{}-{}", file_id, name)
        } else {
            format!("{}/{}-{}", self.key_prefix, file_id, name)
        }
    }

    /// Upload a file to storage and save metadata to database
    ///
    /// The object is not removed again if the database insert fails.
    pub async fn upload_file(&self, file: UploadedFile) -> Result<UploadFileResponseDto> {
        file.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if file.data.len() > self.max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_upload_size
            )));
        }

        let file_id = Uuid::new_v4();
        let file_key = self.object_key(file_id, &file.file_name);
        let file_size = file.data.len() as i64;

        let start = Instant::now();
        let s3_path = self
            .storage
            .put_object(&file_key, &file.data, &file.content_type)
            .await
            .inspect_err(|_| {
                self.metrics
                    .send("S3.PutObject.Errors", 1.0, MetricUnit::Count)
            })?;
        self.metrics.track_storage("PutObject", start);

        debug!("File uploaded to storage: {}", file_key);

        let start = Instant::now();
        let record = self
            .repository
            .insert(NewFile {
                id: file_id,
                file_name: file.file_name,
                s3_path,
                file_type: file.content_type,
                file_size,
            })
            .await
            .inspect_err(|_| {
                warn!("Metadata insert failed, object '{}' left in storage", file_key);
                self.metrics
                    .send("Database.insert.files.Errors", 1.0, MetricUnit::Count)
            })?;
        self.metrics.track_db("insert", "files", start);

        info!(
            "File metadata saved: id={}, key={}, size={}",
            record.id, file_key, record.file_size
        );

        Ok(record.into())
    }

    /// Get file metadata by id
    pub async fn get_file(&self, id: Uuid) -> Result<FileResponseDto> {
        let start = Instant::now();
        let file = self.repository.find_by_id(id).await?;
        self.metrics.track_db("select", "files", start);

        file.map(FileResponseDto::from)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    /// Delete the stored object, then the metadata row
    ///
    /// If the row delete fails after the object is gone, nothing is rolled back.
    pub async fn delete_file(&self, id: Uuid) -> Result<()> {
        let start = Instant::now();
        let file = self.repository.find_by_id(id).await?;
        self.metrics.track_db("select", "files", start);

        let file = file.ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let file_key = self.storage.key_from_location(&file.s3_path).ok_or_else(|| {
            AppError::Storage(format!(
                "Stored path '{}' does not belong to the configured bucket",
                file.s3_path
            ))
        })?;

        let start = Instant::now();
        self.storage
            .delete_object(&file_key)
            .await
            .inspect_err(|_| {
                self.metrics
                    .send("S3.DeleteObject.Errors", 1.0, MetricUnit::Count)
            })?;
        self.metrics.track_storage("DeleteObject", start);

        debug!("File deleted from storage: {}", file_key);

        let start = Instant::now();
        let deleted = self.repository.delete(file.id).await?;
        self.metrics.track_db("delete", "files", start);

        if !deleted {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        info!("File deleted: id={}, key={}", file.id, file_key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_metrics, InMemoryFileRepository, InMemoryStorage};

    fn service() -> (FileService, Arc<InMemoryFileRepository>, Arc<InMemoryStorage>) {
        let repository = Arc::new(InMemoryFileRepository::default());
        let storage = Arc::new(InMemoryStorage::default());
        let service = FileService::new(
            repository.clone(),
            storage.clone(),
            test_metrics(),
            "uploads",
            1024,
        );
        (service, repository, storage)
    }

    fn text_file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            data: b"hello world".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_object_and_record() {
        let (service, repository, storage) = service();

        let uploaded = service.upload_file(text_file("notes.txt")).await.unwrap();

        let key = storage.key_from_location(&uploaded.s3_path).unwrap();
        assert_eq!(key, format!("uploads/{}-notes.txt", uploaded.id));
        assert_eq!(storage.object(&key).unwrap(), b"hello world".to_vec());

        let record = repository.get(uploaded.id).unwrap();
        assert_eq!(record.file_name, "notes.txt");
        assert_eq!(record.file_type, "text/plain");
        assert_eq!(record.file_size, 11);
    }

    #[tokio::test]
    async fn test_upload_sanitizes_key_but_keeps_original_name() {
        let (service, _, storage) = service();

        let uploaded = service
            .upload_file(text_file("my report (final).txt"))
            .await
            .unwrap();

        assert_eq!(uploaded.file_name, "my report (final).txt");
        let key = storage.key_from_location(&uploaded.s3_path).unwrap();
        assert!(key.ends_with("-my_report__final_.txt"));
    }

    #[tokio::test]
    async fn test_upload_rejects_invalid_name() {
        let (service, _, storage) = service();

        let result = service.upload_file(text_file("")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(storage.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_enforces_size_limit() {
        let (service, repository, storage) = service();

        let mut at_limit = text_file("fits.bin");
        at_limit.data = vec![0u8; 1024];
        assert!(service.upload_file(at_limit).await.is_ok());

        let mut over_limit = text_file("too-big.bin");
        over_limit.data = vec![0u8; 1025];
        let result = service.upload_file(over_limit).await;

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert_eq!(storage.object_count(), 1);
        assert_eq!(repository.count(), 1);
    }

    #[tokio::test]
    async fn test_upload_leaves_object_when_insert_fails() {
        let (service, repository, storage) = service();
        repository.fail_writes();

        let result = service.upload_file(text_file("notes.txt")).await;
        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(storage.object_count(), 1);
    }

    #[tokio::test]
    async fn test_get_file_not_found() {
        let (service, _, _) = service();
        let result = service.get_file(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_object_then_record() {
        let (service, repository, storage) = service();
        let uploaded = service.upload_file(text_file("notes.txt")).await.unwrap();

        service.delete_file(uploaded.id).await.unwrap();

        assert_eq!(storage.object_count(), 0);
        assert!(repository.get(uploaded.id).is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_file() {
        let (service, _, _) = service();
        let result = service.delete_file(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_keeps_record_when_storage_fails() {
        let (service, repository, storage) = service();
        let uploaded = service.upload_file(text_file("notes.txt")).await.unwrap();
        storage.fail_requests();

        let result = service.delete_file(uploaded.id).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(repository.get(uploaded.id).is_some());
    }
}
