use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for files
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    pub file_name: String,
    pub s3_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new `files` row
#[derive(Debug, Clone)]
pub struct NewFile {
    pub id: Uuid,
    pub file_name: String,
    pub s3_path: String,
    pub file_type: String,
    pub file_size: i64,
}
