//! Comment and folder message handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::annotation::{service as annotations, AnnotationTarget};
use crate::auth::Principal;
use crate::web::dto::{
    AnnotationResponse, ApiResponse, FileAnnotationQuery, FileCommentRequest,
    FolderAnnotationQuery, FolderCommentRequest, FolderMessageRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::AppState;

type AnnotationList = Json<ApiResponse<Vec<AnnotationResponse>>>;
type Created = (StatusCode, Json<ApiResponse<AnnotationResponse>>);

async fn list_for(
    state: &AppState,
    principal: Principal,
    target: Option<AnnotationTarget>,
    password: Option<&str>,
) -> Result<AnnotationList, ApiError> {
    let found = match target {
        Some(target) => annotations::list(state.pool(), principal, target, password).await?,
        None => Vec::new(),
    };
    Ok(Json(ApiResponse::new(
        found.into_iter().map(AnnotationResponse::from).collect(),
    )))
}

async fn post_to(
    state: &AppState,
    principal: Principal,
    target: AnnotationTarget,
    text: &str,
) -> Result<Created, ApiError> {
    let annotation = annotations::post(state.pool(), principal, target, text).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AnnotationResponse::from(annotation))),
    ))
}

/// GET /api/folder-comments - Comments on a folder, newest first.
#[utoipa::path(
    get,
    path = "/folder-comments",
    tag = "annotations",
    params(FolderAnnotationQuery),
    responses((status = 200, description = "Comments; empty when the folder is unreadable", body = Vec<AnnotationResponse>))
)]
pub async fn list_folder_comments(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Query(query): Query<FolderAnnotationQuery>,
) -> Result<AnnotationList, ApiError> {
    let target = query.folder.map(AnnotationTarget::FolderComment);
    list_for(&state, auth.principal(), target, query.password.as_deref()).await
}

/// POST /api/folder-comments - Comment on a folder.
#[utoipa::path(
    post,
    path = "/folder-comments",
    tag = "annotations",
    request_body = FolderCommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = AnnotationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Private folder of another user"),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Blank text")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_folder_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<FolderCommentRequest>,
) -> Result<Created, ApiError> {
    post_to(
        &state,
        auth.principal(),
        AnnotationTarget::FolderComment(req.folder),
        &req.text,
    )
    .await
}

/// GET /api/file-comments - Comments on a file, newest first.
#[utoipa::path(
    get,
    path = "/file-comments",
    tag = "annotations",
    params(FileAnnotationQuery),
    responses((status = 200, description = "Comments; empty when the file is unreadable", body = Vec<AnnotationResponse>))
)]
pub async fn list_file_comments(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Query(query): Query<FileAnnotationQuery>,
) -> Result<AnnotationList, ApiError> {
    let target = query.file.map(AnnotationTarget::FileComment);
    list_for(&state, auth.principal(), target, query.password.as_deref()).await
}

/// POST /api/file-comments - Comment on a file.
#[utoipa::path(
    post,
    path = "/file-comments",
    tag = "annotations",
    request_body = FileCommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = AnnotationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "File in a private folder of another user"),
        (status = 404, description = "File not found"),
        (status = 422, description = "Blank text")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_file_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<FileCommentRequest>,
) -> Result<Created, ApiError> {
    post_to(
        &state,
        auth.principal(),
        AnnotationTarget::FileComment(req.file),
        &req.text,
    )
    .await
}

/// GET /api/folder-messages - A folder's message board, oldest first.
#[utoipa::path(
    get,
    path = "/folder-messages",
    tag = "annotations",
    params(FolderAnnotationQuery),
    responses(
        (status = 200, description = "Messages; empty when the folder is unreadable", body = Vec<AnnotationResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_folder_messages(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<FolderAnnotationQuery>,
) -> Result<AnnotationList, ApiError> {
    let target = query.folder.map(AnnotationTarget::FolderMessage);
    list_for(&state, auth.principal(), target, query.password.as_deref()).await
}

/// POST /api/folder-messages - Post to a folder's message board.
#[utoipa::path(
    post,
    path = "/folder-messages",
    tag = "annotations",
    request_body = FolderMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = AnnotationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Private folder of another user"),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Blank text")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_folder_message(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<FolderMessageRequest>,
) -> Result<Created, ApiError> {
    post_to(
        &state,
        auth.principal(),
        AnnotationTarget::FolderMessage(req.folder),
        &req.text,
    )
    .await
}
