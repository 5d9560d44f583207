//! Profile, user directory, follow and username suggestion handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};

use crate::auth::{suggest_usernames, update_profile, ProfileUpdateRequest};
use crate::db::{User, UserRepository, UserUpdate};
use crate::folder::service as folders;
use crate::social::toggle_follow;
use crate::web::dto::{
    ApiResponse, FolderResponse, FollowResponse, SuggestionQuery, SuggestionsResponse,
    UpdateProfileRequest, UserResponse, UserSearchQuery, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::{folder_responses, user_response, AppState};

async fn load_user(state: &AppState, user_id: i64) -> Result<User, ApiError> {
    UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/accounts/profile - The caller's own account.
#[utoipa::path(
    get,
    path = "/accounts/profile",
    tag = "accounts",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = load_user(&state, auth.user_id()).await?;
    let user = user_response(state.pool(), user, auth.principal()).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// PATCH /api/accounts/profile - Change username, email or visibility.
#[utoipa::path(
    patch,
    path = "/accounts/profile",
    tag = "accounts",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid or duplicate username or email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_own_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = update_profile(
        state.pool(),
        auth.user_id(),
        ProfileUpdateRequest {
            username: req.username,
            email: req.email,
            is_public: req.is_public,
        },
    )
    .await?;

    let user = user_response(state.pool(), user, auth.principal()).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// POST /api/accounts/profile/photo - Replace the profile photo.
///
/// Expects a multipart form with an image in the `photo` field.
#[utoipa::path(
    post,
    path = "/accounts/profile/photo",
    tag = "accounts",
    request_body(content = Object, content_type = "multipart/form-data", description = "Image in the `photo` field"),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Missing, oversized or non-image upload")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_profile_photo(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let storage = state.storage()?;
    let mut photo: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let filename = field.file_name().unwrap_or("photo").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read photo: {e}")))?;
        photo = Some((filename, content_type, data.to_vec()));
    }

    let (filename, content_type, data) =
        photo.ok_or_else(|| ApiError::field("photo", "No file was submitted."))?;
    if data.len() as u64 > state.max_upload_size {
        return Err(ApiError::field(
            "photo",
            format!(
                "File size must be under {}MB.",
                state.max_upload_size / (1024 * 1024)
            ),
        ));
    }
    let mime = content_type.unwrap_or_else(|| {
        mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string()
    });
    if !mime.starts_with("image/") {
        return Err(ApiError::field("photo", "Upload a valid image."));
    }

    let previous = load_user(&state, auth.user_id()).await?.profile_photo;
    let stored_name = storage.save(&data, &filename).await?;
    let url = storage.url_for(&stored_name);

    let updated = UserRepository::new(state.pool())
        .update(auth.user_id(), &UserUpdate::new().profile_photo(Some(url)))
        .await;
    let user = match updated {
        Ok(Some(user)) => user,
        Ok(None) => {
            let _ = storage.delete(&stored_name).await;
            return Err(ApiError::not_found("User not found"));
        }
        Err(e) => {
            let _ = storage.delete(&stored_name).await;
            return Err(e.into());
        }
    };

    if let Some(old) = previous.as_deref().and_then(|url| url.rsplit('/').next()) {
        if let Err(e) = storage.delete(old).await {
            tracing::warn!(user_id = user.id, error = %e, "Failed to remove previous profile photo");
        }
    }

    tracing::info!(user_id = user.id, "Profile photo updated");
    let user = user_response(state.pool(), user, auth.principal()).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// GET /api/accounts/users - Directory of users, ordered by username.
#[utoipa::path(
    get,
    path = "/accounts/users",
    tag = "accounts",
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let users = UserRepository::new(state.pool()).search(search).await?;

    let mut rendered = Vec::with_capacity(users.len());
    for user in users {
        rendered.push(user_response(state.pool(), user, auth.principal()).await?);
    }
    Ok(Json(ApiResponse::new(rendered)))
}

/// GET /api/accounts/users/{id} - One user.
#[utoipa::path(
    get,
    path = "/accounts/users/{id}",
    tag = "accounts",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = load_user(&state, id).await?;
    let user = user_response(state.pool(), user, auth.principal()).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// GET /api/accounts/users/{id}/folders - Folders owned by a user.
///
/// Owners see all of their folders, everyone else only the public ones.
#[utoipa::path(
    get,
    path = "/accounts/users/{id}/folders",
    tag = "accounts",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user's folders", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_folders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let found = folders::for_user(state.pool(), auth.principal(), id).await?;
    let rendered = folder_responses(state.pool(), found, auth.principal()).await?;
    Ok(Json(ApiResponse::new(rendered)))
}

/// POST /api/accounts/users/{id}/follow - Follow or unfollow a user.
#[utoipa::path(
    post,
    path = "/accounts/users/{id}/follow",
    tag = "accounts",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Follow state after the toggle", body = FollowResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Cannot follow yourself")
    ),
    security(("bearer_auth" = []))
)]
pub async fn follow_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FollowResponse>>, ApiError> {
    let follow = toggle_follow(state.pool(), auth.user_id(), id).await?;
    Ok(Json(ApiResponse::new(follow.into())))
}

/// GET /api/accounts/username-suggestions - Available usernames close to a request.
#[utoipa::path(
    get,
    path = "/accounts/username-suggestions",
    tag = "accounts",
    params(SuggestionQuery),
    responses((status = 200, description = "Up to five free usernames", body = SuggestionsResponse))
)]
pub async fn username_suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<ApiResponse<SuggestionsResponse>>, ApiError> {
    let suggestions = suggest_usernames(state.pool(), &query.username).await?;
    Ok(Json(ApiResponse::new(SuggestionsResponse { suggestions })))
}
