//! Request bodies and query strings.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{double_option, no_control_chars};

/// Login with email and password.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// New account. Uniqueness and format rules are checked by registration
/// itself so the messages stay field-specific.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "no_control_chars"))]
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderRequest {
    #[validate(custom(function = "no_control_chars"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    /// Parent folder id; omitted or null for a root folder.
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub is_listed_in_feed: Option<bool>,
    /// Access password; empty means none.
    #[serde(default)]
    pub password: Option<String>,
}

/// Partial folder update. `parent: null` moves the folder to the root and
/// `password: ""` removes its password.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFolderRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub parent: Option<Option<i64>>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub is_listed_in_feed: Option<bool>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFileRequest {
    #[validate(custom(function = "no_control_chars"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FolderCommentRequest {
    pub folder: i64,
    #[validate(length(max = 10000))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FileCommentRequest {
    pub file: i64,
    #[validate(length(max = 10000))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FolderMessageRequest {
    pub folder: i64,
    #[validate(length(max = 10000))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub text: String,
}

/// Folder listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FolderListQuery {
    /// List the children of this folder instead of every folder.
    pub parent: Option<i64>,
    /// Password of a protected parent.
    pub password: Option<String>,
    /// Case-insensitive match on name or folder code.
    pub search: Option<String>,
}

/// Password for a protected folder.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PasswordQuery {
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FileListQuery {
    pub folder: Option<i64>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FolderAnnotationQuery {
    pub folder: Option<i64>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FileAnnotationQuery {
    pub file: Option<i64>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserSearchQuery {
    /// Substring of a username or email.
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub username: String,
}
