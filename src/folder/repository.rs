//! Folder repository.

use std::collections::HashSet;

use sqlx::QueryBuilder;
use tracing::warn;

use super::types::{generate_folder_code, Folder, FolderUpdate, NewFolder};
use crate::db::{contains_pattern, fold_key, DbPool};
use crate::{Result, StashError};

/// Columns selected for [`Folder`], qualified with the `f` alias.
pub(crate) const FOLDER_COLUMNS: &str = "f.id, f.name, f.description, f.owner_id, f.parent_id, \
     f.is_public, f.is_listed_in_feed, f.folder_code, f.password_hash, f.created_at";

/// Attempts at drawing an unused folder code before giving up.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FolderRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a folder with a freshly drawn folder code.
    ///
    /// A code collision is resolved by drawing again.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_folder_code();
            let result = sqlx::query(
                "INSERT INTO folders
                     (name, name_key, description, owner_id, parent_id, is_public,
                      is_listed_in_feed, folder_code, password_hash)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&folder.name)
            .bind(fold_key(&folder.name))
            .bind(&folder.description)
            .bind(folder.owner_id)
            .bind(folder.parent_id)
            .bind(folder.is_public)
            .bind(folder.is_listed_in_feed)
            .bind(&code)
            .bind(&folder.password_hash)
            .execute(self.pool)
            .await;

            match result {
                Ok(done) => {
                    return self
                        .get_by_id(done.last_insert_rowid())
                        .await?
                        .ok_or_else(|| StashError::NotFound("Folder".to_string()));
                }
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    warn!(attempt, code = %code, "Folder code collision, drawing again");
                }
                Err(e) => return Err(StashError::Database(e.to_string())),
            }
        }

        Err(StashError::Database(
            "could not allocate a unique folder code".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let sql = format!("SELECT {FOLDER_COLUMNS} FROM folders f WHERE f.id = ?");
        let folder = sqlx::query_as::<_, Folder>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// Direct children of `parent_id`, newest first.
    pub async fn list_children(&self, parent_id: i64, search: Option<&str>) -> Result<Vec<Folder>> {
        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {FOLDER_COLUMNS} FROM folders f WHERE f.parent_id = "));
        query.push_bind(parent_id);
        push_search(&mut query, search);
        query.push(" ORDER BY f.created_at DESC, f.id DESC");

        let folders = query
            .build_query_as::<Folder>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// All folders, or only public ones, newest first.
    pub async fn list_all(&self, public_only: bool, search: Option<&str>) -> Result<Vec<Folder>> {
        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {FOLDER_COLUMNS} FROM folders f WHERE 1 = 1"));
        if public_only {
            query.push(" AND f.is_public = 1");
        }
        push_search(&mut query, search);
        query.push(" ORDER BY f.created_at DESC, f.id DESC");

        let folders = query
            .build_query_as::<Folder>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Folders owned by `owner_id`, newest first.
    pub async fn list_by_owner(&self, owner_id: i64, public_only: bool) -> Result<Vec<Folder>> {
        let sql = format!(
            "SELECT {FOLDER_COLUMNS} FROM folders f
             WHERE f.owner_id = ? AND (? = 0 OR f.is_public = 1)
             ORDER BY f.created_at DESC, f.id DESC"
        );
        let folders = sqlx::query_as::<_, Folder>(&sql)
            .bind(owner_id)
            .bind(public_only)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Ids of the direct children of a folder.
    pub async fn child_ids(&self, id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM folders WHERE parent_id = ?")
            .bind(id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(ids)
    }

    /// Ancestor ids of a folder, nearest first. Stops at a repeated id.
    pub async fn ancestor_ids(&self, id: i64) -> Result<Vec<i64>> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = self.get_by_id(id).await?.and_then(|f| f.parent_id);

        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                break;
            }
            ancestors.push(parent_id);
            current = self.get_by_id(parent_id).await?.and_then(|f| f.parent_id);
        }

        Ok(ancestors)
    }

    /// Whether re-parenting `folder_id` under `new_parent_id` would close a
    /// cycle: the new parent is the folder itself or one of its descendants.
    pub async fn would_create_cycle(&self, folder_id: i64, new_parent_id: i64) -> Result<bool> {
        if folder_id == new_parent_id {
            return Ok(true);
        }
        Ok(self.ancestor_ids(new_parent_id).await?.contains(&folder_id))
    }

    pub async fn update(&self, id: i64, update: &FolderUpdate) -> Result<Option<Folder>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE folders SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
            separated.push("name_key = ");
            separated.push_bind_unseparated(fold_key(name));
        }

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }

        if let Some(parent_id) = update.parent_id {
            separated.push("parent_id = ");
            separated.push_bind_unseparated(parent_id);
        }

        if let Some(is_public) = update.is_public {
            separated.push("is_public = ");
            separated.push_bind_unseparated(is_public);
        }

        if let Some(listed) = update.is_listed_in_feed {
            separated.push("is_listed_in_feed = ");
            separated.push_bind_unseparated(listed);
        }

        if let Some(ref hash) = update.password_hash {
            separated.push("password_hash = ");
            separated.push_bind_unseparated(hash.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a folder. Sub-folders, files, likes, views and annotations go
    /// with it through foreign-key cascades.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Case-insensitive literal substring match on name or folder code.
fn push_search(query: &mut QueryBuilder<'_, sqlx::Sqlite>, search: Option<&str>) {
    if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(term);
        query.push(" AND (f.name_key LIKE ");
        query.push_bind(pattern.clone());
        query.push(" ESCAPE '\\' OR lower(f.folder_code) LIKE ");
        query.push_bind(pattern);
        query.push(" ESCAPE '\\')");
    }
}
