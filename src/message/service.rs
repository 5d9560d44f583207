//! Sending messages and grouping them into threads.

use std::collections::HashSet;

use tracing::info;

use crate::db::{DbPool, User, UserRepository};
use crate::{Result, StashError};

use super::repository::{DirectMessage, DirectMessageRepository};

/// Latest exchange with one partner.
#[derive(Debug, Clone)]
pub struct Thread {
    pub partner: User,
    pub last_message: DirectMessage,
}

async fn require_user(pool: &DbPool, user_id: i64) -> Result<User> {
    UserRepository::new(pool)
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| StashError::NotFound("User".to_string()))
}

/// Send `text` from `sender_id` to `receiver_id`.
pub async fn send(pool: &DbPool, sender_id: i64, receiver_id: i64, text: &str) -> Result<DirectMessage> {
    if sender_id == receiver_id {
        return Err(StashError::Validation("Cannot message yourself.".to_string()));
    }
    require_user(pool, receiver_id).await?;

    let text = text.trim();
    if text.is_empty() {
        return Err(StashError::field("text", "Message text is required."));
    }

    let message = DirectMessageRepository::new(pool)
        .create(sender_id, receiver_id, text)
        .await?;
    info!(message_id = message.id, sender_id, receiver_id, "Direct message sent");
    Ok(message)
}

/// The conversation between `user_id` and `other_id`, oldest first.
pub async fn conversation(pool: &DbPool, user_id: i64, other_id: i64) -> Result<Vec<DirectMessage>> {
    if user_id == other_id {
        return Err(StashError::Validation("Cannot open chat with yourself.".to_string()));
    }
    require_user(pool, other_id).await?;

    DirectMessageRepository::new(pool)
        .conversation(user_id, other_id)
        .await
}

/// One thread per partner, most recently active first.
pub async fn threads(pool: &DbPool, user_id: i64) -> Result<Vec<Thread>> {
    let users = UserRepository::new(pool);
    let mut seen = HashSet::new();
    let mut threads = Vec::new();

    for message in DirectMessageRepository::new(pool).involving(user_id).await? {
        let partner_id = message.partner_of(user_id);
        if !seen.insert(partner_id) {
            continue;
        }
        if let Some(partner) = users.get_by_id(partner_id).await? {
            threads.push(Thread {
                partner,
                last_message: message,
            });
        }
    }

    Ok(threads)
}
