//! Storage module for uploaded file bytes
//!
//! Provides the `ObjectStorage` abstraction and its S3 (or S3-compatible)
//! implementation.

mod s3_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use s3_client::S3Client;

/// Blob store holding uploaded file bytes, addressed by object key
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key` and return the object's location URL
    async fn put_object(&self, key: &str, data: &[u8], content_type: &str)
        -> Result<String, AppError>;

    /// Remove the object stored under `key`
    async fn delete_object(&self, key: &str) -> Result<(), AppError>;

    /// Recover the object key from a location previously returned by `put_object`
    fn key_from_location(&self, location: &str) -> Option<String>;
}
