//! Postgres file record repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cabinet_core::error::{AppError, ErrorKind};
use cabinet_core::result::AppResult;
use cabinet_entity::file::{FileRecord, NewFileRecord};

use super::FileRecordStore;
use crate::connection::is_alive;

/// Repository for file records stored in the `files` table.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRecordStore for FileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_children(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<FileRecord>> {
        // IS NOT DISTINCT FROM lets a NULL parameter match root records.
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files WHERE user_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY created_at ASC, id ASC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(parent_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn create(&self, data: &NewFileRecord) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "INSERT INTO files (user_id, name, kind, is_public, parent_id, local_path) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.user_id)
        .bind(&data.name)
        .bind(data.kind)
        .bind(data.is_public)
        .bind(data.parent_id)
        .bind(&data.local_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    async fn set_visibility(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_public: bool,
    ) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET is_public = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(is_public)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update file visibility", e)
        })
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;
        Ok(total.max(0) as u64)
    }

    async fn count_owners(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count owners", e))?;
        Ok(total.max(0) as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        is_alive(&self.pool).await
    }
}
