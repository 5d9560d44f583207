//! Derived folder counts.

use std::collections::HashSet;

use crate::annotation::{AnnotationRepository, AnnotationTarget};
use crate::auth::Principal;
use crate::db::DbPool;
use crate::file::FileRepository;
use crate::Result;

use super::access::counts_visible;
use super::engagement::EngagementRepository;
use super::repository::FolderRepository;
use super::types::Folder;

/// Engagement figures attached to a folder representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FolderStats {
    /// Sub-folders at any depth. `None` when hidden from the viewer.
    pub subfolder_count: Option<i64>,
    /// Files at any depth. `None` when hidden from the viewer.
    pub file_count: Option<i64>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub is_liked: bool,
}

/// Recursive sub-folder and file totals of a folder, in that order.
///
/// Walks the tree with an explicit worklist. A folder reached twice is
/// counted once, so corrupt parent links cannot loop.
pub async fn tree_counts(pool: &DbPool, folder_id: i64) -> Result<(i64, i64)> {
    let folders = FolderRepository::new(pool);
    let files = FileRepository::new(pool);

    let mut visited = HashSet::from([folder_id]);
    let mut pending = vec![folder_id];
    let mut subfolders = 0;
    let mut file_total = 0;

    while let Some(current) = pending.pop() {
        file_total += files.count_by_folder(current).await?;
        for child in folders.child_ids(current).await? {
            if visited.insert(child) {
                subfolders += 1;
                pending.push(child);
            }
        }
    }

    Ok((subfolders, file_total))
}

/// Compute the engagement figures of `folder` as seen by `principal`.
///
/// Read access must already have been established by the caller.
pub async fn folder_stats(pool: &DbPool, folder: &Folder, principal: Principal) -> Result<FolderStats> {
    let engagement = EngagementRepository::new(pool);

    let (subfolder_count, file_count) = if counts_visible(principal, folder) {
        let (subfolders, files) = tree_counts(pool, folder.id).await?;
        (Some(subfolders), Some(files))
    } else {
        (None, None)
    };

    let is_liked = match principal.user_id() {
        Some(user_id) => engagement.is_liked(folder.id, user_id).await?,
        None => false,
    };

    Ok(FolderStats {
        subfolder_count,
        file_count,
        view_count: engagement.view_count(folder.id).await?,
        like_count: engagement.like_count(folder.id).await?,
        comment_count: AnnotationRepository::new(pool)
            .count(AnnotationTarget::FolderComment(folder.id))
            .await?,
        is_liked,
    })
}
