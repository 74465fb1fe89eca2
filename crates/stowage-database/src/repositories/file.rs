//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::types::{FileId, FolderId, OwnerId};
use stowage_entity::{CreateFile, File};

use super::store_error;
use crate::store::FileStore;

/// Repository for file records in PostgreSQL.
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
impl FileStore for FileRepository {
    async fn insert(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (owner_id, folder_id, name, storage_path, size_bytes, mime_type) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.storage_path)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::not_found(format!("Folder {} not found", data.folder_id))
            }
            _ => AppError::with_source(ErrorKind::Store, "Failed to create file record", e),
        })
    }

    async fn find_by_id(&self, owner_id: OwnerId, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("Failed to find file"))
    }

    async fn find_by_folder(&self, owner_id: OwnerId, folder_id: FolderId) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND folder_id = $2 ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("Failed to list files"))
    }

    async fn list_folder_files(&self, folder_id: FolderId) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE folder_id = $1")
            .bind(folder_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("Failed to list folder files"))
    }

    async fn update_storage_path(
        &self,
        owner_id: OwnerId,
        id: FileId,
        storage_path: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET storage_path = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(storage_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("Failed to update file storage path"))
    }

    async fn rename(&self, owner_id: OwnerId, id: FileId, name: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("Failed to rename file"))
    }

    async fn delete(&self, owner_id: OwnerId, id: FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(store_error("Failed to delete file record"))?;
        Ok(result.rows_affected() > 0)
    }
}
