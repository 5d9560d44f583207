//! Access-checked posting and listing of annotations.

use tracing::info;

use crate::auth::Principal;
use crate::db::DbPool;
use crate::file::FileRepository;
use crate::folder::access::{decide, require_engage, require_owner};
use crate::folder::{Folder, FolderRepository};
use crate::{Result, StashError};

use super::repository::{Annotation, AnnotationRepository, AnnotationTarget, NewAnnotation};

/// Folder an annotation target belongs to, if both exist.
async fn owning_folder(pool: &DbPool, target: AnnotationTarget) -> Result<Option<Folder>> {
    let folder_id = match target {
        AnnotationTarget::FolderComment(id) | AnnotationTarget::FolderMessage(id) => id,
        AnnotationTarget::FileComment(file_id) => {
            match FileRepository::new(pool).get_by_id(file_id).await? {
                Some(file) => file.folder_id,
                None => return Ok(None),
            }
        }
    };
    FolderRepository::new(pool).get_by_id(folder_id).await
}

/// Post an annotation on behalf of `principal`.
///
/// Comments are a write on the target's folder and need its owner. Folder
/// messages need an authenticated principal and a public or owned folder.
/// Text is trimmed and must not be blank.
pub async fn post(
    pool: &DbPool,
    principal: Principal,
    target: AnnotationTarget,
    text: &str,
) -> Result<Annotation> {
    let user_id = principal
        .user_id()
        .ok_or_else(|| StashError::Auth("authentication required".to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(StashError::field("text", "This field may not be blank."));
    }

    let folder = owning_folder(pool, target).await?.ok_or_else(|| {
        StashError::NotFound(match target {
            AnnotationTarget::FileComment(_) => "File".to_string(),
            _ => "Folder".to_string(),
        })
    })?;
    match target {
        AnnotationTarget::FolderMessage(_) => require_engage(principal, &folder)?,
        AnnotationTarget::FolderComment(_) | AnnotationTarget::FileComment(_) => {
            require_owner(principal, &folder)?
        }
    }

    let annotation = AnnotationRepository::new(pool)
        .create(&NewAnnotation::new(target, user_id, text))
        .await?;

    info!(
        annotation_id = annotation.id,
        kind = target.kind().as_str(),
        target_id = target.target_id(),
        user_id,
        "Annotation posted"
    );
    Ok(annotation)
}

/// List annotations of a target readable by `principal`.
///
/// Unknown or unreadable targets yield an empty list. Folder messages are
/// only shown to authenticated principals.
pub async fn list(
    pool: &DbPool,
    principal: Principal,
    target: AnnotationTarget,
    password: Option<&str>,
) -> Result<Vec<Annotation>> {
    if matches!(target, AnnotationTarget::FolderMessage(_)) && !principal.is_authenticated() {
        return Ok(Vec::new());
    }

    match owning_folder(pool, target).await? {
        Some(folder) if decide(principal, &folder, password).can_read() => {
            AnnotationRepository::new(pool).list(target).await
        }
        _ => Ok(Vec::new()),
    }
}
