//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::types::{FolderId, OwnerId};
use stowage_entity::{CreateFolder, DeletionPlan, Folder};

use super::{map_write_error, store_error};
use crate::store::FolderStore;

/// Repository for folder records in PostgreSQL.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (owner_id, parent_id, name, is_root) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.is_root)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create folder", &data.name))
    }

    async fn find_by_id(&self, owner_id: OwnerId, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("Failed to find folder"))
    }

    async fn find_root(&self, owner_id: OwnerId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS NULL",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("Failed to find root folder"))
    }

    async fn find_children(
        &self,
        owner_id: OwnerId,
        parent_id: FolderId,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id = $2 ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("Failed to list subfolders"))
    }

    async fn find_all_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("Failed to load folders"))
    }

    async fn count_by_owner(&self, owner_id: OwnerId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("Failed to count folders"))?;
        Ok(count as u64)
    }

    async fn rename(
        &self,
        owner_id: OwnerId,
        id: FolderId,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to rename folder", name))
    }

    async fn touch(&self, owner_id: OwnerId, id: FolderId) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE folders SET updated_at = NOW() WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .execute(&self.pool)
                .await
                .map_err(store_error("Failed to touch folder"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_child_folders(&self, parent_id: FolderId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("Failed to list child folders"))
    }

    async fn delete_subtree(&self, plan: &DeletionPlan) -> AppResult<()> {
        let folder_ids: Vec<Uuid> = plan.folders.iter().map(|id| id.into_uuid()).collect();
        let file_ids: Vec<Uuid> = plan.file_ids().into_iter().map(|id| id.into_uuid()).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_error("Failed to begin transaction"))?;

        let locked: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT id, owner_id FROM folders WHERE id = ANY($1) FOR UPDATE",
        )
        .bind(&folder_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(store_error("Failed to lock folders"))?;

        if locked
            .iter()
            .any(|(_, owner)| *owner != plan.owner_id.into_uuid())
        {
            return Err(AppError::authorization(
                "Folder subtree contains entries owned by another account",
            ));
        }

        let removed_files = sqlx::query("DELETE FROM files WHERE id = ANY($1) AND owner_id = $2")
            .bind(&file_ids)
            .bind(plan.owner_id)
            .execute(&mut *tx)
            .await
            .map_err(store_error("Failed to delete file records"))?
            .rows_affected();

        for &id in &plan.folders {
            sqlx::query("DELETE FROM folders WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(plan.owner_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                        AppError::conflict(format!(
                            "Folder {id} gained new entries while being deleted"
                        ))
                    }
                    _ => AppError::with_source(ErrorKind::Store, "Failed to delete folder", e),
                })?;
        }

        tx.commit()
            .await
            .map_err(store_error("Failed to commit folder deletion"))?;

        debug!(
            owner_id = %plan.owner_id,
            folders = plan.folders.len(),
            files = removed_files,
            "Folder subtree removed from metadata store"
        );
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(store_error("Metadata store health check failed"))
    }
}
