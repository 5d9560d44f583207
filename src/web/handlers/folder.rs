//! Folder handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::folder::service::{self as folders, ChangeFolder, CreateFolder, FolderQuery};
use crate::folder::{decide, feed, EngagementRepository, FolderRepository};
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, FolderListQuery, FolderResponse, LikeResponse,
    PasswordQuery, UpdateFolderRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::{folder_response, folder_responses, AppState};

type FolderList = Json<ApiResponse<Vec<FolderResponse>>>;

/// GET /api/folders - Folders visible to the caller.
///
/// With `parent`, the children of that folder if it is readable (an empty
/// list otherwise). Without it, every folder for authenticated callers and
/// public ones for anonymous callers.
#[utoipa::path(
    get,
    path = "/folders",
    tag = "folders",
    params(FolderListQuery),
    responses((status = 200, description = "Folders", body = Vec<FolderResponse>))
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Query(query): Query<FolderListQuery>,
) -> Result<FolderList, ApiError> {
    let principal = auth.principal();
    let found = folders::list(
        state.pool(),
        principal,
        &FolderQuery {
            parent_id: query.parent,
            password: query.password,
            search: query.search,
        },
    )
    .await?;

    Ok(Json(ApiResponse::new(
        folder_responses(state.pool(), found, principal).await?,
    )))
}

/// POST /api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Parent folder owned by someone else"),
        (status = 422, description = "Invalid name or missing parent")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let folder = folders::create(
        state.pool(),
        auth.principal(),
        CreateFolder {
            name: req.name,
            description: req.description,
            parent_id: req.parent,
            is_public: req.is_public,
            is_listed_in_feed: req.is_listed_in_feed,
            password: req.password,
        },
    )
    .await?;

    let response = folder_response(state.pool(), folder, auth.principal()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// GET /api/folders/{id} - Folder detail.
///
/// Records a view for authenticated callers.
#[utoipa::path(
    get,
    path = "/folders/{id}",
    tag = "folders",
    params(("id" = i64, Path, description = "Folder ID"), PasswordQuery),
    responses(
        (status = 200, description = "Folder", body = FolderResponse),
        (status = 403, description = "Private folder without a valid password"),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(id): Path<i64>,
    Query(query): Query<PasswordQuery>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let principal = auth.principal();
    let (folder, _) = folders::retrieve(state.pool(), principal, id, query.password.as_deref()).await?;
    Ok(Json(ApiResponse::new(
        folder_response(state.pool(), folder, principal).await?,
    )))
}

/// PATCH /api/folders/{id} - Change a folder the caller owns.
#[utoipa::path(
    patch,
    path = "/folders/{id}",
    tag = "folders",
    params(("id" = i64, Path, description = "Folder ID")),
    request_body = UpdateFolderRequest,
    responses(
        (status = 200, description = "Updated folder", body = FolderResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Invalid name or parent")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateFolderRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = folders::update(
        state.pool(),
        auth.principal(),
        id,
        ChangeFolder {
            name: req.name,
            description: req.description,
            parent_id: req.parent,
            is_public: req.is_public,
            is_listed_in_feed: req.is_listed_in_feed,
            password: req.password,
        },
    )
    .await?;

    Ok(Json(ApiResponse::new(
        folder_response(state.pool(), folder, auth.principal()).await?,
    )))
}

/// DELETE /api/folders/{id} - Delete a folder and everything under it.
#[utoipa::path(
    delete,
    path = "/folders/{id}",
    tag = "folders",
    params(("id" = i64, Path, description = "Folder ID")),
    responses(
        (status = 204, description = "Folder deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Folder not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    folders::delete(state.pool(), state.file_storage.as_ref(), auth.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/folders/feed - Popular listed folders.
#[utoipa::path(
    get,
    path = "/folders/feed",
    tag = "folders",
    responses((status = 200, description = "Folders ranked by views, likes and comments", body = Vec<FolderResponse>))
)]
pub async fn popular_feed(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
) -> Result<FolderList, ApiError> {
    let principal = auth.principal();
    let found = feed::popular(state.pool(), principal).await?;
    Ok(Json(ApiResponse::new(
        folder_responses(state.pool(), found, principal).await?,
    )))
}

/// GET /api/folders/following-feed - Listed folders of followed users.
#[utoipa::path(
    get,
    path = "/folders/following-feed",
    tag = "folders",
    responses(
        (status = 200, description = "Newest folders of followed users", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn following_feed(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<FolderList, ApiError> {
    let found = feed::following(state.pool(), auth.user_id()).await?;
    Ok(Json(ApiResponse::new(
        folder_responses(state.pool(), found, auth.principal()).await?,
    )))
}

/// GET /api/folders/mine - The caller's folders.
#[utoipa::path(
    get,
    path = "/folders/mine",
    tag = "folders",
    responses(
        (status = 200, description = "Folders owned by the caller", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_folders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<FolderList, ApiError> {
    let found = FolderRepository::new(state.pool())
        .list_by_owner(auth.user_id(), false)
        .await?;
    Ok(Json(ApiResponse::new(
        folder_responses(state.pool(), found, auth.principal()).await?,
    )))
}

/// GET /api/folders/liked - Folders the caller liked, most recent like first.
///
/// Folders that have since become unreadable are left out.
#[utoipa::path(
    get,
    path = "/folders/liked",
    tag = "folders",
    responses(
        (status = 200, description = "Liked folders", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn liked_folders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<FolderList, ApiError> {
    let principal = auth.principal();
    let found = EngagementRepository::new(state.pool())
        .liked_folders(auth.user_id())
        .await?
        .into_iter()
        .filter(|folder| decide(principal, folder, None).can_read())
        .collect();
    Ok(Json(ApiResponse::new(
        folder_responses(state.pool(), found, principal).await?,
    )))
}

/// POST /api/folders/{id}/like - Like or unlike a folder.
#[utoipa::path(
    post,
    path = "/folders/{id}/like",
    tag = "folders",
    params(("id" = i64, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Private folder of another user"),
        (status = 404, description = "Folder not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn like_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<LikeResponse>>, ApiError> {
    let like = folders::toggle_like(state.pool(), auth.principal(), id).await?;
    Ok(Json(ApiResponse::new(like.into())))
}
