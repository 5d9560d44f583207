//! File records and their repository.

use super::storage::FileStorage;
use crate::db::DbPool;
use crate::{Result, StashError};

const FILE_COLUMNS: &str =
    "id, name, stored_name, size, content_type, folder_id, owner_id, uploaded_at";

/// An uploaded file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredFile {
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Storage name (`{uuid}.{ext}`).
    pub stored_name: String,
    /// Size in bytes.
    pub size: i64,
    pub content_type: String,
    pub folder_id: i64,
    pub owner_id: i64,
    pub uploaded_at: String,
}

/// Data for creating a file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub folder_id: i64,
    pub owner_id: i64,
    pub name: String,
    pub stored_name: String,
    pub size: i64,
    pub content_type: String,
}

impl NewFile {
    /// A record with a freshly generated stored name.
    pub fn new(
        folder_id: i64,
        owner_id: i64,
        name: impl Into<String>,
        size: i64,
        content_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            folder_id,
            owner_id,
            stored_name: FileStorage::generate_stored_name(&name),
            name,
            size,
            content_type: content_type.into(),
        }
    }

    pub fn with_stored_name(mut self, stored_name: impl Into<String>) -> Self {
        self.stored_name = stored_name.into();
        self
    }
}

/// Repository for file records.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, file: &NewFile) -> Result<StoredFile> {
        let result = sqlx::query(
            "INSERT INTO files (name, stored_name, size, content_type, folder_id, owner_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.name)
        .bind(&file.stored_name)
        .bind(file.size)
        .bind(&file.content_type)
        .bind(file.folder_id)
        .bind(file.owner_id)
        .execute(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| StashError::NotFound("File".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<StoredFile>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?");
        let file = sqlx::query_as::<_, StoredFile>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(file)
    }

    /// Files directly inside a folder, newest first.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<StoredFile>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE folder_id = ?
             ORDER BY uploaded_at DESC, id DESC"
        );
        let files = sqlx::query_as::<_, StoredFile>(&sql)
            .bind(folder_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Files uploaded by a user, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<StoredFile>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE owner_id = ?
             ORDER BY uploaded_at DESC, id DESC"
        );
        let files = sqlx::query_as::<_, StoredFile>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Number of files directly inside a folder.
    pub async fn count_by_folder(&self, folder_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE folder_id = ?")
            .bind(folder_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(count)
    }

    /// Stored names of every file under a folder, at any depth.
    pub async fn stored_names_in_subtree(&self, folder_id: i64) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "WITH RECURSIVE subtree(id) AS (
                 SELECT ?
                 UNION
                 SELECT f.id FROM folders f JOIN subtree s ON f.parent_id = s.id
             )
             SELECT stored_name FROM files WHERE folder_id IN (SELECT id FROM subtree)",
        )
        .bind(folder_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(names)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<Option<StoredFile>> {
        let result = sqlx::query("UPDATE files SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::folder::{FolderRepository, NewFolder};
    use crate::Database;

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let folder = FolderRepository::new(db.pool())
            .create(&NewFolder::new(user.id, "Docs"))
            .await
            .unwrap();
        (db, user.id, folder.id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, owner, folder) = setup().await;
        let repo = FileRepository::new(db.pool());

        let file = repo
            .create(&NewFile::new(folder, owner, "notes.txt", 42, "text/plain"))
            .await
            .unwrap();

        assert_eq!(file.name, "notes.txt");
        assert!(file.stored_name.ends_with(".txt"));
        assert_eq!(file.size, 42);
        assert_eq!(file.content_type, "text/plain");
        assert_eq!(file.folder_id, folder);
        assert_eq!(file.owner_id, owner);

        let fetched = repo.get_by_id(file.id).await.unwrap().unwrap();
        assert_eq!(fetched.stored_name, file.stored_name);
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let (db, owner, folder) = setup().await;
        let repo = FileRepository::new(db.pool());
        let a = repo
            .create(&NewFile::new(folder, owner, "a.txt", 1, "text/plain"))
            .await
            .unwrap();
        let b = repo
            .create(&NewFile::new(folder, owner, "b.txt", 1, "text/plain"))
            .await
            .unwrap();

        let ids: Vec<_> = repo
            .list_by_folder(folder)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);
        assert_eq!(repo.count_by_folder(folder).await.unwrap(), 2);
        assert_eq!(repo.list_by_owner(owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stored_names_in_subtree() {
        let (db, owner, root) = setup().await;
        let folders = FolderRepository::new(db.pool());
        let child = folders
            .create(&NewFolder::new(owner, "child").with_parent(root))
            .await
            .unwrap();
        let sibling = folders.create(&NewFolder::new(owner, "sibling")).await.unwrap();

        let repo = FileRepository::new(db.pool());
        let top = repo
            .create(&NewFile::new(root, owner, "top.png", 1, "image/png"))
            .await
            .unwrap();
        let deep = repo
            .create(&NewFile::new(child.id, owner, "deep.png", 1, "image/png"))
            .await
            .unwrap();
        repo.create(&NewFile::new(sibling.id, owner, "other.png", 1, "image/png"))
            .await
            .unwrap();

        let mut names = repo.stored_names_in_subtree(root).await.unwrap();
        names.sort();
        let mut expected = vec![top.stored_name, deep.stored_name];
        expected.sort();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let (db, owner, folder) = setup().await;
        let repo = FileRepository::new(db.pool());
        let file = repo
            .create(&NewFile::new(folder, owner, "draft.txt", 1, "text/plain"))
            .await
            .unwrap();

        let renamed = repo.rename(file.id, "final.txt").await.unwrap().unwrap();
        assert_eq!(renamed.name, "final.txt");
        assert_eq!(renamed.stored_name, file.stored_name);

        assert!(repo.delete(file.id).await.unwrap());
        assert!(repo.get_by_id(file.id).await.unwrap().is_none());
        assert!(repo.rename(file.id, "x").await.unwrap().is_none());
    }
}
