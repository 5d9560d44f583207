//! Response bodies.

use serde::Serialize;
use utoipa::ToSchema;

use crate::annotation::Annotation;
use crate::datetime::to_rfc3339;
use crate::db::User;
use crate::folder::{Folder, FolderStats, LikeState};
use crate::message::DirectMessage;
use crate::social::FollowState;

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Issued token pair.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Public view of an account.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_public: bool,
    pub profile_photo: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    /// Whether the viewer follows this user. Always false for anonymous viewers.
    pub is_following: bool,
    pub created_at: String,
}

impl UserResponse {
    pub fn new(user: User, followers_count: i64, following_count: i64, is_following: bool) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_public: user.is_public,
            profile_photo: user.profile_photo,
            followers_count,
            following_count,
            is_following,
            created_at: to_rfc3339(&user.created_at),
        }
    }
}

/// Folder with owner details and engagement figures.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub owner_username: String,
    pub owner_profile_photo: Option<String>,
    pub parent: Option<i64>,
    pub is_public: bool,
    pub is_listed_in_feed: bool,
    pub has_password: bool,
    pub folder_code: String,
    pub created_at: String,
    /// Sub-folders at any depth; null when hidden from the viewer.
    pub subfolder_count: Option<i64>,
    /// Files at any depth; null when hidden from the viewer.
    pub file_count: Option<i64>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub is_liked: bool,
}

impl FolderResponse {
    pub fn new(folder: Folder, owner: Option<&User>, stats: FolderStats) -> Self {
        let has_password = folder.has_password();
        Self {
            id: folder.id,
            name: folder.name,
            description: folder.description,
            owner_id: folder.owner_id,
            owner_username: owner.map(|u| u.username.clone()).unwrap_or_default(),
            owner_profile_photo: owner.and_then(|u| u.profile_photo.clone()),
            parent: folder.parent_id,
            is_public: folder.is_public,
            is_listed_in_feed: folder.is_listed_in_feed,
            has_password,
            folder_code: folder.folder_code,
            created_at: to_rfc3339(&folder.created_at),
            subfolder_count: stats.subfolder_count,
            file_count: stats.file_count,
            view_count: stats.view_count,
            like_count: stats.like_count,
            comment_count: stats.comment_count,
            is_liked: stats.is_liked,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: i64,
    pub name: String,
    /// URL of the stored payload.
    pub file: String,
    pub size: i64,
    pub content_type: String,
    pub folder: i64,
    pub owner: i64,
    pub uploaded_at: String,
    pub comment_count: i64,
}

/// A comment or folder message.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnnotationResponse {
    pub id: i64,
    /// `folder_comment`, `file_comment` or `folder_message`.
    pub kind: String,
    pub target_id: i64,
    pub owner: i64,
    pub owner_username: String,
    pub text: String,
    pub created_at: String,
}

impl From<Annotation> for AnnotationResponse {
    fn from(annotation: Annotation) -> Self {
        let target_id = annotation
            .target()
            .map(|target| target.target_id())
            .unwrap_or_default();
        Self {
            id: annotation.id,
            kind: annotation.kind,
            target_id,
            owner: annotation.owner_id,
            owner_username: annotation.owner_username,
            text: annotation.text,
            created_at: to_rfc3339(&annotation.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DirectMessageResponse {
    pub id: i64,
    pub sender: i64,
    pub receiver: i64,
    pub text: String,
    pub created_at: String,
}

impl From<DirectMessage> for DirectMessageResponse {
    fn from(message: DirectMessage) -> Self {
        Self {
            id: message.id,
            sender: message.sender_id,
            receiver: message.receiver_id,
            text: message.text,
            created_at: to_rfc3339(&message.created_at),
        }
    }
}

/// Latest exchange with one conversation partner.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadResponse {
    pub user: UserResponse,
    pub last_message: String,
    pub last_message_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FollowResponse {
    pub following: bool,
    pub followers_count: i64,
}

impl From<FollowState> for FollowResponse {
    fn from(state: FollowState) -> Self {
        Self {
            following: state.following,
            followers_count: state.followers_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

impl From<LikeState> for LikeResponse {
    fn from(state: LikeState) -> Self {
        Self {
            liked: state.liked,
            like_count: state.like_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}
