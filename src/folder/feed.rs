//! Folder feeds.

use crate::auth::Principal;
use crate::db::DbPool;
use crate::{Result, StashError};

use super::repository::FOLDER_COLUMNS;
use super::types::Folder;

/// Listed folders ranked by popularity.
///
/// Ordering is distinct viewers, then likes, then folder comments, then
/// creation time, all descending, with the id as the final tie-break.
/// Anonymous principals only see public folders.
pub async fn popular(pool: &DbPool, principal: Principal) -> Result<Vec<Folder>> {
    let sql = format!(
        "SELECT {FOLDER_COLUMNS} FROM folders f
         WHERE f.is_listed_in_feed = 1 AND (? = 1 OR f.is_public = 1)
         ORDER BY
             (SELECT COUNT(*) FROM folder_views v WHERE v.folder_id = f.id) DESC,
             (SELECT COUNT(*) FROM folder_likes l WHERE l.folder_id = f.id) DESC,
             (SELECT COUNT(*) FROM annotations a
                 WHERE a.folder_id = f.id AND a.kind = 'folder_comment') DESC,
             f.created_at DESC,
             f.id DESC"
    );
    let folders = sqlx::query_as::<_, Folder>(&sql)
        .bind(principal.is_authenticated())
        .fetch_all(pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

    Ok(folders)
}

/// Listed folders of the users `user_id` follows, newest first.
///
/// Private folders only appear to their owner.
pub async fn following(pool: &DbPool, user_id: i64) -> Result<Vec<Folder>> {
    let sql = format!(
        "SELECT {FOLDER_COLUMNS} FROM folders f
         JOIN follows fw ON fw.followee_id = f.owner_id
         WHERE fw.follower_id = ?
           AND f.is_listed_in_feed = 1
           AND (f.is_public = 1 OR f.owner_id = ?)
         ORDER BY f.created_at DESC, f.id DESC"
    );
    let folders = sqlx::query_as::<_, Folder>(&sql)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

    Ok(folders)
}
