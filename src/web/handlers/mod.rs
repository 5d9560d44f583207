//! API handlers and the state they share.

pub mod account;
pub mod annotation;
pub mod auth;
pub mod chat;
pub mod file;
pub mod folder;

use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};

use crate::annotation::{AnnotationRepository, AnnotationTarget};
use crate::auth::Principal;
use crate::db::{DbPool, FollowRepository, User, UserRepository};
use crate::file::{FileService, FileStorage, StoredFile};
use crate::folder::{folder_stats, Folder};
use crate::web::dto::{FileResponse, FolderResponse, UserResponse};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;
use crate::Database;

pub use account::*;
pub use annotation::*;
pub use auth::*;
pub use chat::*;
pub use file::*;
pub use folder::*;

/// Database handle shared by every request.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDatabase,
    pub encoding_key: EncodingKey,
    /// Access token lifetime in seconds.
    pub access_token_expiry: u64,
    /// Refresh token lifetime in days.
    pub refresh_token_expiry: u64,
    /// Payload storage; the file endpoints fail without it.
    pub file_storage: Option<FileStorage>,
    /// Upload limit in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    pub fn new(db: SharedDatabase, jwt_secret: &str, access_expiry: u64, refresh_expiry: u64) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
            file_storage: None,
            max_upload_size: crate::file::DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_file_storage(mut self, storage: FileStorage, max_upload_size: u64) -> Self {
        self.file_storage = Some(storage);
        self.max_upload_size = max_upload_size;
        self
    }

    pub fn pool(&self) -> &DbPool {
        self.db.pool()
    }

    pub fn storage(&self) -> Result<&FileStorage, ApiError> {
        self.file_storage.as_ref().ok_or_else(|| {
            tracing::error!("File storage is not configured");
            ApiError::internal("File storage is not available")
        })
    }

    pub fn files(&self) -> Result<FileService<'_>, ApiError> {
        Ok(FileService::new(self.pool(), self.storage()?).with_max_file_size(self.max_upload_size))
    }

    pub fn generate_access_token(&self, user_id: i64, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    pub fn generate_refresh_token(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Render a user with follow figures relative to `viewer`.
pub(crate) async fn user_response(
    pool: &DbPool,
    user: User,
    viewer: Principal,
) -> Result<UserResponse, ApiError> {
    let follows = FollowRepository::new(pool);
    let followers = follows.count_followers(user.id).await?;
    let following = follows.count_following(user.id).await?;
    let is_following = match viewer.user_id() {
        Some(viewer_id) if viewer_id != user.id => follows.is_following(viewer_id, user.id).await?,
        _ => false,
    };
    Ok(UserResponse::new(user, followers, following, is_following))
}

pub(crate) async fn folder_response(
    pool: &DbPool,
    folder: Folder,
    viewer: Principal,
) -> Result<FolderResponse, ApiError> {
    let stats = folder_stats(pool, &folder, viewer).await?;
    let owner = UserRepository::new(pool).get_by_id(folder.owner_id).await?;
    Ok(FolderResponse::new(folder, owner.as_ref(), stats))
}

pub(crate) async fn folder_responses(
    pool: &DbPool,
    folders: Vec<Folder>,
    viewer: Principal,
) -> Result<Vec<FolderResponse>, ApiError> {
    let mut rendered = Vec::with_capacity(folders.len());
    for folder in folders {
        rendered.push(folder_response(pool, folder, viewer).await?);
    }
    Ok(rendered)
}

pub(crate) async fn file_response(
    pool: &DbPool,
    storage: &FileStorage,
    file: StoredFile,
) -> Result<FileResponse, ApiError> {
    let comment_count = AnnotationRepository::new(pool)
        .count(AnnotationTarget::FileComment(file.id))
        .await?;
    Ok(FileResponse {
        id: file.id,
        file: storage.url_for(&file.stored_name),
        name: file.name,
        size: file.size,
        content_type: file.content_type,
        folder: file.folder_id,
        owner: file.owner_id,
        uploaded_at: crate::datetime::to_rfc3339(&file.uploaded_at),
        comment_count,
    })
}
