//! Folder operations with access control.

use tracing::{info, warn};

use crate::auth::{hash_secret, Principal};
use crate::db::{DbPool, UserRepository};
use crate::file::{FileRepository, FileStorage};
use crate::{Result, StashError};

use super::access::{decide, require_owner, require_read, Access};
use super::engagement::{EngagementRepository, LikeState};
use super::repository::FolderRepository;
use super::types::{Folder, FolderUpdate, NewFolder};

/// Maximum length of a folder name (in characters).
pub const MAX_FOLDER_NAME_LENGTH: usize = 255;

/// Fields of a folder to create.
#[derive(Debug, Clone, Default)]
pub struct CreateFolder {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub is_public: Option<bool>,
    pub is_listed_in_feed: Option<bool>,
    /// Access password; blank means none.
    pub password: Option<String>,
}

/// Requested folder changes. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ChangeFolder {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` moves the folder to the root.
    pub parent_id: Option<Option<i64>>,
    pub is_public: Option<bool>,
    pub is_listed_in_feed: Option<bool>,
    /// `Some("")` clears the password, any other value replaces it.
    pub password: Option<String>,
}

/// Folder listing filters.
#[derive(Debug, Clone, Default)]
pub struct FolderQuery {
    pub parent_id: Option<i64>,
    pub password: Option<String>,
    pub search: Option<String>,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StashError::field("name", "This field may not be blank."));
    }
    if name.chars().count() > MAX_FOLDER_NAME_LENGTH {
        return Err(StashError::field(
            "name",
            format!("Ensure this field has no more than {MAX_FOLDER_NAME_LENGTH} characters."),
        ));
    }
    Ok(name.to_string())
}

fn hash_folder_password(password: &str) -> Result<String> {
    hash_secret(password).map_err(|e| StashError::field("password", e.to_string()))
}

async fn load(pool: &DbPool, folder_id: i64) -> Result<Folder> {
    FolderRepository::new(pool)
        .get_by_id(folder_id)
        .await?
        .ok_or_else(|| StashError::NotFound("Folder".to_string()))
}

/// Resolve a parent for a folder owned by `owner_id`.
async fn owned_parent(pool: &DbPool, owner_id: i64, parent_id: i64) -> Result<Folder> {
    let parent = FolderRepository::new(pool)
        .get_by_id(parent_id)
        .await?
        .ok_or_else(|| StashError::field("parent", "Parent folder does not exist."))?;
    if parent.owner_id != owner_id {
        return Err(StashError::Permission(
            "You can only create folders inside your own folders.".to_string(),
        ));
    }
    Ok(parent)
}

/// Create a folder owned by `principal`.
pub async fn create(pool: &DbPool, principal: Principal, request: CreateFolder) -> Result<Folder> {
    let owner_id = principal
        .user_id()
        .ok_or_else(|| StashError::Auth("authentication required".to_string()))?;

    let mut folder = NewFolder::new(owner_id, validate_name(&request.name)?);
    if let Some(description) = request.description {
        folder = folder.with_description(description.trim());
    }
    if let Some(parent_id) = request.parent_id {
        owned_parent(pool, owner_id, parent_id).await?;
        folder = folder.with_parent(parent_id);
    }
    if let Some(is_public) = request.is_public {
        folder = folder.with_public(is_public);
    }
    if let Some(listed) = request.is_listed_in_feed {
        folder = folder.with_listed_in_feed(listed);
    }
    if let Some(password) = request.password.filter(|p| !p.is_empty()) {
        folder = folder.with_password_hash(hash_folder_password(&password)?);
    }

    let folder = FolderRepository::new(pool).create(&folder).await?;
    info!(folder_id = folder.id, owner_id, code = %folder.folder_code, "Folder created");
    Ok(folder)
}

/// Fetch a folder for detail display and record the view.
///
/// An authenticated principal granted access is counted as a viewer once.
pub async fn retrieve(
    pool: &DbPool,
    principal: Principal,
    folder_id: i64,
    password: Option<&str>,
) -> Result<(Folder, Access)> {
    let folder = load(pool, folder_id).await?;
    let access = require_read(principal, &folder, password)?;

    if let Some(user_id) = principal.user_id() {
        EngagementRepository::new(pool)
            .record_view(folder.id, user_id)
            .await?;
    }

    Ok((folder, access))
}

/// List folders.
///
/// With a parent, the parent must be readable or the result is empty.
/// Without one, anonymous principals only see public folders.
pub async fn list(pool: &DbPool, principal: Principal, query: &FolderQuery) -> Result<Vec<Folder>> {
    let repo = FolderRepository::new(pool);
    let search = query.search.as_deref();

    match query.parent_id {
        Some(parent_id) => match repo.get_by_id(parent_id).await? {
            Some(parent) if decide(principal, &parent, query.password.as_deref()).can_read() => {
                repo.list_children(parent_id, search).await
            }
            _ => Ok(Vec::new()),
        },
        None => repo.list_all(!principal.is_authenticated(), search).await,
    }
}

/// Folders of `user_id`. Others only see the public ones.
pub async fn for_user(pool: &DbPool, principal: Principal, user_id: i64) -> Result<Vec<Folder>> {
    UserRepository::new(pool)
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| StashError::NotFound("User".to_string()))?;

    FolderRepository::new(pool)
        .list_by_owner(user_id, !principal.is(user_id))
        .await
}

/// Apply owner changes to a folder.
pub async fn update(
    pool: &DbPool,
    principal: Principal,
    folder_id: i64,
    changes: ChangeFolder,
) -> Result<Folder> {
    let repo = FolderRepository::new(pool);
    let folder = load(pool, folder_id).await?;
    require_owner(principal, &folder)?;

    let mut update = FolderUpdate::new();
    if let Some(name) = changes.name {
        update = update.name(validate_name(&name)?);
    }
    if let Some(description) = changes.description {
        update = update.description(description.trim());
    }
    if let Some(parent_id) = changes.parent_id {
        if let Some(parent_id) = parent_id {
            owned_parent(pool, folder.owner_id, parent_id).await?;
            if repo.would_create_cycle(folder.id, parent_id).await? {
                return Err(StashError::field(
                    "parent",
                    "A folder cannot be moved inside itself.",
                ));
            }
        }
        update = update.parent_id(parent_id);
    }
    if let Some(is_public) = changes.is_public {
        update = update.is_public(is_public);
    }
    if let Some(listed) = changes.is_listed_in_feed {
        update = update.is_listed_in_feed(listed);
    }
    if let Some(password) = changes.password {
        let hash = if password.is_empty() {
            None
        } else {
            Some(hash_folder_password(&password)?)
        };
        update = update.password_hash(hash);
    }

    let folder = repo
        .update(folder.id, &update)
        .await?
        .ok_or_else(|| StashError::NotFound("Folder".to_string()))?;
    info!(folder_id = folder.id, "Folder updated");
    Ok(folder)
}

/// Delete a folder with everything below it, then remove the stored
/// payloads of its files. Payload removal failures are only logged.
pub async fn delete(
    pool: &DbPool,
    storage: Option<&FileStorage>,
    principal: Principal,
    folder_id: i64,
) -> Result<()> {
    let folder = load(pool, folder_id).await?;
    require_owner(principal, &folder)?;

    let stored_names = FileRepository::new(pool)
        .stored_names_in_subtree(folder.id)
        .await?;
    FolderRepository::new(pool).delete(folder.id).await?;

    if let Some(storage) = storage {
        for stored_name in &stored_names {
            if let Err(e) = storage.delete(stored_name).await {
                warn!(stored_name = %stored_name, error = %e, "Failed to remove stored payload");
            }
        }
    }

    info!(folder_id, files = stored_names.len(), "Folder deleted");
    Ok(())
}

/// Toggle the principal's like on a folder.
pub async fn toggle_like(pool: &DbPool, principal: Principal, folder_id: i64) -> Result<LikeState> {
    let folder = load(pool, folder_id).await?;
    require_owner(principal, &folder)?;

    let user_id = principal
        .user_id()
        .ok_or_else(|| StashError::Auth("authentication required".to_string()))?;
    EngagementRepository::new(pool).toggle_like(folder.id, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::file::NewFile;
    use crate::Database;
    use tempfile::TempDir;

    async fn setup() -> (Database, Principal, Principal) {
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
        (db, Principal::User(alice.id), Principal::User(bob.id))
    }

    fn private_with_password(name: &str) -> CreateFolder {
        CreateFolder {
            name: name.to_string(),
            is_public: Some(false),
            password: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_with_password() {
        let (db, alice, _bob) = setup().await;
        let folder = create(db.pool(), alice, private_with_password(" Vault "))
            .await
            .unwrap();
        assert_eq!(folder.name, "Vault");
        assert!(!folder.is_public);
        assert!(folder.has_password());

        let open = create(
            db.pool(),
            alice,
            CreateFolder {
                name: "Open".to_string(),
                password: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!open.has_password());
        assert!(open.is_public);
    }

    #[tokio::test]
    async fn test_create_requires_own_parent() {
        let (db, alice, bob) = setup().await;
        let parent = create(db.pool(), alice, CreateFolder { name: "p".into(), ..Default::default() })
            .await
            .unwrap();

        let err = create(
            db.pool(),
            bob,
            CreateFolder {
                name: "intruder".into(),
                parent_id: Some(parent.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StashError::Permission(_)));

        let err = create(db.pool(), Principal::Anonymous, CreateFolder { name: "x".into(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, StashError::Auth(_)));

        let err = create(db.pool(), alice, CreateFolder { name: "  ".into(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, StashError::FieldValidation { ref field, .. } if field == "name"));
    }

    #[tokio::test]
    async fn test_retrieve_records_a_single_view() {
        let (db, alice, bob) = setup().await;
        let folder = create(db.pool(), alice, CreateFolder { name: "f".into(), ..Default::default() })
            .await
            .unwrap();

        retrieve(db.pool(), bob, folder.id, None).await.unwrap();
        retrieve(db.pool(), bob, folder.id, None).await.unwrap();
        retrieve(db.pool(), Principal::Anonymous, folder.id, None).await.unwrap();

        let views = EngagementRepository::new(db.pool())
            .view_count(folder.id)
            .await
            .unwrap();
        assert_eq!(views, 1);
    }

    #[tokio::test]
    async fn test_password_reads_but_never_writes() {
        let (db, alice, bob) = setup().await;
        let folder = create(db.pool(), alice, private_with_password("vault"))
            .await
            .unwrap();

        assert!(matches!(
            retrieve(db.pool(), bob, folder.id, Some("wrong")).await,
            Err(StashError::Permission(_))
        ));
        let (_, access) = retrieve(db.pool(), bob, folder.id, Some("secret")).await.unwrap();
        assert_eq!(access, Access::Read);

        let err = update(
            db.pool(),
            bob,
            folder.id,
            ChangeFolder {
                name: Some("stolen".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StashError::Permission(_)));
        assert!(matches!(
            delete(db.pool(), None, bob, folder.id).await,
            Err(StashError::Permission(_))
        ));
        assert!(matches!(
            toggle_like(db.pool(), bob, folder.id).await,
            Err(StashError::Permission(_))
        ));
        assert!(matches!(
            create(
                db.pool(),
                bob,
                CreateFolder {
                    name: "child".into(),
                    parent_id: Some(folder.id),
                    ..Default::default()
                }
            )
            .await,
            Err(StashError::Permission(_))
        ));

        assert_eq!(load(db.pool(), folder.id).await.unwrap().name, "vault");
    }

    #[tokio::test]
    async fn test_list_children_degrades_to_empty() {
        let (db, alice, bob) = setup().await;
        let parent = create(db.pool(), alice, private_with_password("parent"))
            .await
            .unwrap();
        create(
            db.pool(),
            alice,
            CreateFolder {
                name: "child".into(),
                parent_id: Some(parent.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let mut query = FolderQuery {
            parent_id: Some(parent.id),
            ..Default::default()
        };
        assert!(list(db.pool(), bob, &query).await.unwrap().is_empty());
        assert_eq!(list(db.pool(), alice, &query).await.unwrap().len(), 1);

        query.password = Some("secret".into());
        assert_eq!(list(db.pool(), bob, &query).await.unwrap().len(), 1);

        query.parent_id = Some(424242);
        assert!(list(db.pool(), alice, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_without_parent() {
        let (db, alice, bob) = setup().await;
        create(db.pool(), alice, CreateFolder { name: "Public Pics".into(), ..Default::default() })
            .await
            .unwrap();
        create(db.pool(), alice, private_with_password("Private pics"))
            .await
            .unwrap();

        let all = FolderQuery::default();
        assert_eq!(list(db.pool(), Principal::Anonymous, &all).await.unwrap().len(), 1);
        assert_eq!(list(db.pool(), bob, &all).await.unwrap().len(), 2);

        let search = FolderQuery {
            search: Some("PUBLIC".into()),
            ..Default::default()
        };
        assert_eq!(list(db.pool(), bob, &search).await.unwrap().len(), 1);

        let bob_id = bob.user_id().unwrap();
        let alice_id = alice.user_id().unwrap();
        assert_eq!(for_user(db.pool(), bob, alice_id).await.unwrap().len(), 1);
        assert_eq!(for_user(db.pool(), alice, alice_id).await.unwrap().len(), 2);
        assert!(for_user(db.pool(), alice, bob_id).await.unwrap().is_empty());
        assert!(matches!(
            for_user(db.pool(), alice, 999).await,
            Err(StashError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_password_and_parent() {
        let (db, alice, _bob) = setup().await;
        let a = create(db.pool(), alice, private_with_password("a")).await.unwrap();
        let b = create(
            db.pool(),
            alice,
            CreateFolder {
                name: "b".into(),
                parent_id: Some(a.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let cleared = update(
            db.pool(),
            alice,
            a.id,
            ChangeFolder {
                password: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!cleared.has_password());

        let err = update(
            db.pool(),
            alice,
            a.id,
            ChangeFolder {
                parent_id: Some(Some(b.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StashError::FieldValidation { ref field, .. } if field == "parent"));

        let moved = update(
            db.pool(),
            alice,
            b.id,
            ChangeFolder {
                parent_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.parent_id, None);
    }

    #[tokio::test]
    async fn test_delete_removes_stored_payloads() {
        let (db, alice, _bob) = setup().await;
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path(), "/media").unwrap();

        let root = create(db.pool(), alice, CreateFolder { name: "root".into(), ..Default::default() })
            .await
            .unwrap();
        let child = create(
            db.pool(),
            alice,
            CreateFolder {
                name: "child".into(),
                parent_id: Some(root.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let new_file = NewFile::new(child.id, alice.user_id().unwrap(), "a.txt", 1, "text/plain");
        storage.save_with_name(b"a", &new_file.stored_name).await.unwrap();
        FileRepository::new(db.pool()).create(&new_file).await.unwrap();

        delete(db.pool(), Some(&storage), alice, root.id).await.unwrap();
        assert!(!storage.exists(&new_file.stored_name));
        assert!(matches!(load(db.pool(), child.id).await, Err(StashError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_like_involution() {
        let (db, alice, bob) = setup().await;
        let folder = create(db.pool(), alice, CreateFolder { name: "f".into(), ..Default::default() })
            .await
            .unwrap();

        let first = toggle_like(db.pool(), alice, folder.id).await.unwrap();
        assert_eq!(first, LikeState { liked: true, like_count: 1 });
        let second = toggle_like(db.pool(), alice, folder.id).await.unwrap();
        assert_eq!(second, LikeState { liked: false, like_count: 0 });
        assert!(matches!(
            toggle_like(db.pool(), bob, folder.id).await,
            Err(StashError::Permission(_))
        ));
        assert!(matches!(
            toggle_like(db.pool(), Principal::Anonymous, folder.id).await,
            Err(StashError::Auth(_))
        ));
    }
}
