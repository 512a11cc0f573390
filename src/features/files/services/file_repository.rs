use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::models::{File, NewFile};

/// Persistence for file metadata
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn insert(&self, file: NewFile) -> Result<File>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>>;

    /// Returns `false` when no row matched
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn insert(&self, file: NewFile) -> Result<File> {
        let file = sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (id, file_name, s3_path, file_type, file_size)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, file_name, s3_path, file_type, file_size, created_at, updated_at
            "#,
        )
        .bind(file.id)
        .bind(file.file_name)
        .bind(file.s3_path)
        .bind(file.file_type)
        .bind(file.file_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(
            r#"
            SELECT id, file_name, s3_path, file_type, file_size, created_at, updated_at
            FROM files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
