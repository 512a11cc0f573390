//! S3 storage client
//!
//! Talks to AWS S3, or to any S3-compatible store (MinIO, LocalStack) when a
//! custom endpoint is configured. Uses rust-s3 for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::ObjectStorage;
use crate::core::config::StorageConfig;
use crate::core::error::AppError;

pub struct S3Client {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    /// Custom endpoints are addressed path-style and may need bucket creation
    custom_endpoint: bool,
}

impl S3Client {
    /// Create a new S3 client from configuration
    ///
    /// Credentials fall back to the standard AWS chain (environment, profile,
    /// instance metadata) when no static keys are configured.
    pub fn new(config: &StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to load S3 credentials: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => config.region.parse::<Region>().map_err(|e| {
                AppError::Internal(format!("Invalid AWS region '{}': {}", config.region, e))
            })?,
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create S3 bucket handle: {}", e)))?;

        if config.endpoint.is_some() {
            // http://endpoint/bucket instead of http://bucket.endpoint
            bucket.set_path_style();
        }

        info!(
            "S3 client configured for bucket: {}, region: {}",
            bucket.name(),
            config.region
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            custom_endpoint: config.endpoint.is_some(),
        })
    }

    /// Ensure the bucket exists on S3-compatible stores, create if not
    ///
    /// On AWS the bucket is provisioned out of band, so this is a no-op there.
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        if !self.custom_endpoint {
            return Ok(());
        }

        match Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(response) if response.success() => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Ok(response) => {
                debug!(
                    "Bucket '{}' not created (status {}), assuming it exists",
                    self.bucket.name(),
                    response.response_code
                );
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    fn location_prefix(&self) -> String {
        format!("{}/", self.bucket.url())
    }
}

#[async_trait]
impl ObjectStorage for S3Client {
    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Upload of '{}' rejected with status {}",
                key, status
            )));
        }

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(format!("{}{}", self.location_prefix(), key))
    }

    async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Delete of '{}' rejected with status {}",
                key, status
            )));
        }

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    fn key_from_location(&self, location: &str) -> Option<String> {
        location
            .strip_prefix(&self.location_prefix())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}
