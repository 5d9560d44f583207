//! File operations with access control.
//!
//! Reads go through the owning folder's access rules. Uploads, renames
//! and deletions are reserved to the owner.

use tracing::{info, warn};

use crate::auth::Principal;
use crate::db::DbPool;
use crate::folder::access::{self, require_file_read};
use crate::folder::{Access, Folder, FolderRepository};
use crate::{Result, StashError};

use super::metadata::{FileRepository, NewFile, StoredFile};
use super::storage::FileStorage;
use super::{DEFAULT_MAX_FILE_SIZE, MAX_FILENAME_LENGTH};

/// An upload as received from a client.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub folder_id: i64,
    /// Filename sent by the client.
    pub filename: String,
    /// Display name overriding the filename.
    pub name: Option<String>,
    /// Content type sent by the client.
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl UploadRequest {
    pub fn new(folder_id: i64, filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            folder_id,
            filename: filename.into(),
            name: None,
            content_type: None,
            content,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Service for file uploads and access-checked reads.
pub struct FileService<'a> {
    pool: &'a DbPool,
    storage: &'a FileStorage,
    max_file_size: u64,
}

impl<'a> FileService<'a> {
    pub fn new(pool: &'a DbPool, storage: &'a FileStorage) -> Self {
        Self {
            pool,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Store an upload into a folder owned by `principal`.
    pub async fn upload(&self, principal: Principal, request: UploadRequest) -> Result<StoredFile> {
        let user_id = principal
            .user_id()
            .ok_or_else(|| StashError::Auth("authentication required".to_string()))?;

        let folder = self.folder(request.folder_id).await?;
        if folder.owner_id != user_id {
            return Err(StashError::Permission(
                "You can only upload files to your own folders.".to_string(),
            ));
        }

        if request.content.len() as u64 > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(StashError::field(
                "file",
                format!("File size must be under {max_mb}MB."),
            ));
        }

        let name = validate_name(request.name.as_deref().unwrap_or(&request.filename))?;
        let content_type = request
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&request.filename)
                    .first_or_octet_stream()
                    .to_string()
            });

        let new_file = NewFile::new(
            folder.id,
            user_id,
            name,
            request.content.len() as i64,
            content_type,
        )
        .with_stored_name(FileStorage::generate_stored_name(&request.filename));

        self.storage
            .save_with_name(&request.content, &new_file.stored_name)
            .await?;

        match FileRepository::new(self.pool).create(&new_file).await {
            Ok(file) => {
                info!(file_id = file.id, folder_id = folder.id, user_id, size = file.size, "File uploaded");
                Ok(file)
            }
            Err(e) => {
                self.discard(&new_file.stored_name).await;
                Err(e)
            }
        }
    }

    /// Fetch a file readable by `principal`.
    pub async fn get(
        &self,
        principal: Principal,
        file_id: i64,
        password: Option<&str>,
    ) -> Result<(StoredFile, Access)> {
        let file = self.file(file_id).await?;
        let folder = self.folder(file.folder_id).await?;
        let access = require_file_read(principal, &folder, password)?;
        Ok((file, access))
    }

    /// List files of a folder, or the principal's own files without one.
    ///
    /// A missing or unreadable folder yields an empty list.
    pub async fn list(
        &self,
        principal: Principal,
        folder_id: Option<i64>,
        password: Option<&str>,
    ) -> Result<Vec<StoredFile>> {
        let files = FileRepository::new(self.pool);

        let Some(folder_id) = folder_id else {
            return match principal.user_id() {
                Some(user_id) => files.list_by_owner(user_id).await,
                None => Ok(Vec::new()),
            };
        };

        match FolderRepository::new(self.pool).get_by_id(folder_id).await? {
            Some(folder) if access::decide(principal, &folder, password).can_read() => {
                files.list_by_folder(folder_id).await
            }
            _ => Ok(Vec::new()),
        }
    }

    pub async fn rename(&self, principal: Principal, file_id: i64, name: &str) -> Result<StoredFile> {
        let file = self.owned_file(principal, file_id).await?;
        let name = validate_name(name)?;

        FileRepository::new(self.pool)
            .rename(file.id, &name)
            .await?
            .ok_or_else(|| StashError::NotFound("File".to_string()))
    }

    /// Delete a file record and its payload.
    pub async fn delete(&self, principal: Principal, file_id: i64) -> Result<()> {
        let file = self.owned_file(principal, file_id).await?;

        FileRepository::new(self.pool).delete(file.id).await?;
        self.discard(&file.stored_name).await;

        info!(file_id, "File deleted");
        Ok(())
    }

    async fn discard(&self, stored_name: &str) {
        if let Err(e) = self.storage.delete(stored_name).await {
            warn!(stored_name, error = %e, "Failed to remove stored payload");
        }
    }

    async fn file(&self, file_id: i64) -> Result<StoredFile> {
        FileRepository::new(self.pool)
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| StashError::NotFound("File".to_string()))
    }

    async fn folder(&self, folder_id: i64) -> Result<Folder> {
        FolderRepository::new(self.pool)
            .get_by_id(folder_id)
            .await?
            .ok_or_else(|| StashError::NotFound("Folder".to_string()))
    }

    async fn owned_file(&self, principal: Principal, file_id: i64) -> Result<StoredFile> {
        let user_id = principal
            .user_id()
            .ok_or_else(|| StashError::Auth("authentication required".to_string()))?;
        let file = self.file(file_id).await?;
        if file.owner_id != user_id {
            return Err(StashError::Permission("You do not own this file.".to_string()));
        }
        Ok(file)
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StashError::field("name", "This field may not be blank."));
    }
    if name.chars().count() > MAX_FILENAME_LENGTH {
        return Err(StashError::field(
            "name",
            format!("Ensure this field has no more than {MAX_FILENAME_LENGTH} characters."),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_secret;
    use crate::db::{NewUser, UserRepository};
    use crate::folder::NewFolder;
    use crate::Database;
    use tempfile::TempDir;

    struct Fixture {
        db: Database,
        storage: FileStorage,
        _dir: TempDir,
        alice: i64,
        bob: i64,
        private: Folder,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path(), "/media").unwrap();
        let users = UserRepository::new(db.pool());
        let alice = users
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap()
            .id;
        let bob = users
            .create(&NewUser::new("bob", "bob@example.com", "hash"))
            .await
            .unwrap()
            .id;
        let private = FolderRepository::new(db.pool())
            .create(
                &NewFolder::new(alice, "Private")
                    .with_public(false)
                    .with_password_hash(hash_secret("secret").unwrap()),
            )
            .await
            .unwrap();
        Fixture {
            db,
            storage,
            _dir: dir,
            alice,
            bob,
            private,
        }
    }

    #[tokio::test]
    async fn test_upload_stores_payload_and_guesses_type() {
        let fx = setup().await;
        let service = FileService::new(fx.db.pool(), &fx.storage);

        let file = service
            .upload(
                Principal::User(fx.alice),
                UploadRequest::new(fx.private.id, "photo.png", vec![1, 2, 3]),
            )
            .await
            .unwrap();

        assert_eq!(file.name, "photo.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.size, 3);
        assert!(fx.storage.exists(&file.stored_name));
    }

    #[tokio::test]
    async fn test_upload_requires_folder_owner() {
        let fx = setup().await;
        let service = FileService::new(fx.db.pool(), &fx.storage);

        let err = service
            .upload(
                Principal::User(fx.bob),
                UploadRequest::new(fx.private.id, "x.txt", vec![0]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StashError::Permission(_)));

        let err = service
            .upload(
                Principal::Anonymous,
                UploadRequest::new(fx.private.id, "x.txt", vec![0]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StashError::Auth(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_payload() {
        let fx = setup().await;
        let service = FileService::new(fx.db.pool(), &fx.storage).with_max_file_size(1024 * 1024);

        let err = service
            .upload(
                Principal::User(fx.alice),
                UploadRequest::new(fx.private.id, "big.bin", vec![0; 1024 * 1024 + 1]),
            )
            .await
            .unwrap_err();
        match err {
            StashError::FieldValidation { field, message } => {
                assert_eq!(field, "file");
                assert_eq!(message, "File size must be under 1MB.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            FileRepository::new(fx.db.pool())
                .count_by_folder(fx.private.id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_get_and_list_follow_folder_access() {
        let fx = setup().await;
        let service = FileService::new(fx.db.pool(), &fx.storage);
        let file = service
            .upload(
                Principal::User(fx.alice),
                UploadRequest::new(fx.private.id, "doc.txt", b"hi".to_vec()),
            )
            .await
            .unwrap();

        let bob = Principal::User(fx.bob);
        assert!(matches!(
            service.get(bob, file.id, None).await,
            Err(StashError::Permission(_))
        ));
        let (_, access) = service.get(bob, file.id, Some("secret")).await.unwrap();
        assert_eq!(access, Access::Read);

        assert!(service.list(bob, Some(fx.private.id), None).await.unwrap().is_empty());
        assert_eq!(
            service
                .list(bob, Some(fx.private.id), Some("secret"))
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(service.list(bob, Some(9999), None).await.unwrap().is_empty());
        assert_eq!(
            service
                .list(Principal::User(fx.alice), None, None)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(service.list(Principal::Anonymous, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_password_holder_cannot_rename_or_delete() {
        let fx = setup().await;
        let service = FileService::new(fx.db.pool(), &fx.storage);
        let file = service
            .upload(
                Principal::User(fx.alice),
                UploadRequest::new(fx.private.id, "doc.txt", b"hi".to_vec()),
            )
            .await
            .unwrap();

        let bob = Principal::User(fx.bob);
        assert!(service.get(bob, file.id, Some("secret")).await.is_ok());
        assert!(matches!(
            service.rename(bob, file.id, "mine.txt").await,
            Err(StashError::Permission(_))
        ));
        assert!(matches!(
            service.delete(bob, file.id).await,
            Err(StashError::Permission(_))
        ));

        let renamed = service
            .rename(Principal::User(fx.alice), file.id, " final.txt ")
            .await
            .unwrap();
        assert_eq!(renamed.name, "final.txt");

        service.delete(Principal::User(fx.alice), file.id).await.unwrap();
        assert!(!fx.storage.exists(&file.stored_name));
    }
}
