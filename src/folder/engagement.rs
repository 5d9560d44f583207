//! Likes and views on folders.

use tracing::debug;

use super::repository::FOLDER_COLUMNS;
use super::types::Folder;
use crate::db::DbPool;
use crate::{Result, StashError};

/// New like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

/// Repository for folder likes and views.
pub struct EngagementRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> EngagementRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Flip the like edge between `user_id` and `folder_id`.
    pub async fn toggle_like(&self, folder_id: i64, user_id: i64) -> Result<LikeState> {
        let removed = sqlx::query("DELETE FROM folder_likes WHERE folder_id = ? AND user_id = ?")
            .bind(folder_id)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        let liked = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(
                "INSERT INTO folder_likes (folder_id, user_id) VALUES (?, ?)
                 ON CONFLICT(folder_id, user_id) DO NOTHING",
            )
            .bind(folder_id)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;
            true
        };

        debug!(folder_id, user_id, liked, "Like toggled");
        Ok(LikeState {
            liked,
            like_count: self.like_count(folder_id).await?,
        })
    }

    pub async fn like_count(&self, folder_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folder_likes WHERE folder_id = ?")
            .bind(folder_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(count)
    }

    pub async fn is_liked(&self, folder_id: i64, user_id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM folder_likes WHERE folder_id = ? AND user_id = ?",
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Folders liked by `user_id`, most recently liked first.
    pub async fn liked_folders(&self, user_id: i64) -> Result<Vec<Folder>> {
        let sql = format!(
            "SELECT {FOLDER_COLUMNS} FROM folders f
             JOIN folder_likes l ON l.folder_id = f.id
             WHERE l.user_id = ?
             ORDER BY l.created_at DESC, f.id DESC"
        );
        let folders = sqlx::query_as::<_, Folder>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Record that `user_id` viewed `folder_id`. Repeat views are no-ops and
    /// keep the first timestamp. Returns whether a row was inserted.
    pub async fn record_view(&self, folder_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO folder_views (folder_id, user_id) VALUES (?, ?)
             ON CONFLICT(folder_id, user_id) DO NOTHING",
        )
        .bind(folder_id)
        .bind(user_id)
        .execute(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of distinct viewers.
    pub async fn view_count(&self, folder_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folder_views WHERE folder_id = ?")
            .bind(folder_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::folder::{FolderRepository, NewFolder};
    use crate::Database;

    async fn setup() -> (Database, i64, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        let alice = users
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let bob = users
            .create(&NewUser::new("bob", "bob@example.com", "hash"))
            .await
            .unwrap();
        let folder = FolderRepository::new(db.pool())
            .create(&NewFolder::new(alice.id, "Shared"))
            .await
            .unwrap();
        (db, alice.id, bob.id, folder.id)
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_state() {
        let (db, _alice, bob, folder) = setup().await;
        let repo = EngagementRepository::new(db.pool());

        let state = repo.toggle_like(folder, bob).await.unwrap();
        assert_eq!(state, LikeState { liked: true, like_count: 1 });
        assert!(repo.is_liked(folder, bob).await.unwrap());

        let state = repo.toggle_like(folder, bob).await.unwrap();
        assert_eq!(state, LikeState { liked: false, like_count: 0 });
        assert!(!repo.is_liked(folder, bob).await.unwrap());
    }

    #[tokio::test]
    async fn test_liked_folders() {
        let (db, alice, bob, folder) = setup().await;
        let repo = EngagementRepository::new(db.pool());
        repo.toggle_like(folder, bob).await.unwrap();

        let liked = repo.liked_folders(bob).await.unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].id, folder);
        assert!(repo.liked_folders(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_view_is_idempotent() {
        let (db, alice, bob, folder) = setup().await;
        let repo = EngagementRepository::new(db.pool());

        assert!(repo.record_view(folder, bob).await.unwrap());
        assert!(!repo.record_view(folder, bob).await.unwrap());
        assert_eq!(repo.view_count(folder).await.unwrap(), 1);

        repo.record_view(folder, alice).await.unwrap();
        assert_eq!(repo.view_count(folder).await.unwrap(), 2);
    }
}
