//! Follow graph operations.

use tracing::info;

use crate::db::{DbPool, FollowRepository, UserRepository};
use crate::{Result, StashError};

/// State of a follow edge after a toggle, with the target's follower count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowState {
    pub following: bool,
    pub followers_count: i64,
}

/// Flip whether `follower_id` follows `target_id`.
///
/// Following yourself is a validation error and changes nothing.
pub async fn toggle_follow(pool: &DbPool, follower_id: i64, target_id: i64) -> Result<FollowState> {
    if follower_id == target_id {
        return Err(StashError::Validation("You cannot follow yourself.".to_string()));
    }

    UserRepository::new(pool)
        .get_by_id(target_id)
        .await?
        .ok_or_else(|| StashError::NotFound("User".to_string()))?;

    let follows = FollowRepository::new(pool);
    let following = if follows.unfollow(follower_id, target_id).await? {
        false
    } else {
        follows.follow(follower_id, target_id).await?;
        true
    };

    let followers_count = follows.count_followers(target_id).await?;
    info!(follower_id, target_id, following, "Follow toggled");

    Ok(FollowState {
        following,
        followers_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::Database;

    async fn setup() -> (Database, i64, i64) {
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
        (db, alice.id, bob.id)
    }

    #[tokio::test]
    async fn test_toggle_twice_is_identity() {
        let (db, alice, bob) = setup().await;
        let follows = FollowRepository::new(db.pool());
        let before = follows.count_followers(bob).await.unwrap();

        let on = toggle_follow(db.pool(), alice, bob).await.unwrap();
        assert_eq!(on, FollowState { following: true, followers_count: before + 1 });

        let off = toggle_follow(db.pool(), alice, bob).await.unwrap();
        assert_eq!(off, FollowState { following: false, followers_count: before });
        assert!(!follows.is_following(alice, bob).await.unwrap());
    }

    #[tokio::test]
    async fn test_edges_are_directed() {
        let (db, alice, bob) = setup().await;
        toggle_follow(db.pool(), alice, bob).await.unwrap();
        let state = toggle_follow(db.pool(), bob, alice).await.unwrap();
        assert!(state.following);

        let follows = FollowRepository::new(db.pool());
        assert!(follows.is_following(alice, bob).await.unwrap());
        assert!(follows.is_following(bob, alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_follow_rejected_without_mutation() {
        let (db, alice, _bob) = setup().await;
        let err = toggle_follow(db.pool(), alice, alice).await.unwrap_err();
        assert!(matches!(err, StashError::Validation(_)));
        assert_eq!(
            FollowRepository::new(db.pool()).count_followers(alice).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_missing_target() {
        let (db, alice, _bob) = setup().await;
        assert!(matches!(
            toggle_follow(db.pool(), alice, 999).await,
            Err(StashError::NotFound(_))
        ));
    }
}
