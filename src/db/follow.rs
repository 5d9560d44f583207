//! Directed follow edges between users.

use super::DbPool;
use crate::{Result, StashError};

/// Repository for the `follows` relation.
///
/// An edge `(a, b)` means `a` follows `b`; `(b, a)` is independent.
pub struct FollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FollowRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Add an edge. Returns `false` if it already existed.
    pub async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followee_id) VALUES (?, ?)
             ON CONFLICT(follower_id, followee_id) DO NOTHING",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove an edge. Returns `false` if there was none.
    pub async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followee_id = ?")
            .bind(follower_id)
            .bind(followee_id)
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND followee_id = ?)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(exists)
    }

    /// Number of users following `user_id`.
    pub async fn count_followers(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE followee_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(count)
    }

    /// Number of users `user_id` follows.
    pub async fn count_following(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = ?")
            .bind(user_id)
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
    use crate::Database;

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        let a = users
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let b = users
            .create(&NewUser::new("bob", "bob@example.com", "hash"))
            .await
            .unwrap();
        (db, a.id, b.id)
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let (db, a, b) = setup().await;
        let repo = FollowRepository::new(db.pool());

        assert!(repo.follow(a, b).await.unwrap());
        assert!(!repo.follow(a, b).await.unwrap());
        assert!(repo.is_following(a, b).await.unwrap());
        assert!(!repo.is_following(b, a).await.unwrap());

        assert_eq!(repo.count_followers(b).await.unwrap(), 1);
        assert_eq!(repo.count_following(a).await.unwrap(), 1);
        assert_eq!(repo.count_followers(a).await.unwrap(), 0);

        assert!(repo.unfollow(a, b).await.unwrap());
        assert!(!repo.unfollow(a, b).await.unwrap());
        assert_eq!(repo.count_followers(b).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_self_follow_rejected_by_schema() {
        let (db, a, _) = setup().await;
        let repo = FollowRepository::new(db.pool());

        assert!(repo.follow(a, a).await.is_err());
    }
}
