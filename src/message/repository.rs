//! Direct message records.

use crate::db::DbPool;
use crate::{Result, StashError};

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, text, created_at";

/// A message between two users.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DirectMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: String,
    pub created_at: String,
}

impl DirectMessage {
    /// The other participant, seen from `user_id`.
    pub fn partner_of(&self, user_id: i64) -> i64 {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

/// Repository for direct messages. Records are append-only.
pub struct DirectMessageRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> DirectMessageRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, sender_id: i64, receiver_id: i64, text: &str) -> Result<DirectMessage> {
        let result = sqlx::query(
            "INSERT INTO direct_messages (sender_id, receiver_id, text) VALUES (?, ?, ?)",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(text)
        .execute(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| StashError::NotFound("Message".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<DirectMessage>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM direct_messages WHERE id = ?");
        let message = sqlx::query_as::<_, DirectMessage>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(message)
    }

    /// Messages exchanged between two users, oldest first.
    pub async fn conversation(&self, a: i64, b: i64) -> Result<Vec<DirectMessage>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM direct_messages
             WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
             ORDER BY created_at ASC, id ASC"
        );
        let messages = sqlx::query_as::<_, DirectMessage>(&sql)
            .bind(a)
            .bind(b)
            .bind(b)
            .bind(a)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(messages)
    }

    /// Every message sent or received by a user, newest first.
    pub async fn involving(&self, user_id: i64) -> Result<Vec<DirectMessage>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM direct_messages
             WHERE sender_id = ? OR receiver_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let messages = sqlx::query_as::<_, DirectMessage>(&sql)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(messages)
    }
}
