//! File handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::file::UploadRequest;
use crate::web::dto::{
    ApiResponse, FileListQuery, FileResponse, PasswordQuery, UpdateFileRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::{file_response, AppState};

/// Multipart upload fields.
#[derive(Default)]
struct UploadForm {
    folder: Option<String>,
    name: Option<String>,
    file: Option<(String, Option<String>, Vec<u8>)>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("folder") => form.folder = Some(text_field(field).await?),
                Some("name") => form.name = Some(text_field(field).await?),
                Some("file") => {
                    let filename = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                    form.file = Some((filename, content_type, data.to_vec()));
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_request(self) -> Result<UploadRequest, ApiError> {
        let folder_id = self
            .folder
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::field("folder", "This field is required."))?
            .parse::<i64>()
            .map_err(|_| ApiError::field("folder", "A valid integer is required."))?;

        let (filename, content_type, data) = self
            .file
            .ok_or_else(|| ApiError::field("file", "No file was submitted."))?;

        let mut request = UploadRequest::new(folder_id, filename, data);
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            request = request.with_name(name);
        }
        if let Some(content_type) = content_type {
            request = request.with_content_type(content_type);
        }
        Ok(request)
    }
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid form field: {e}")))
}

/// GET /api/files - Files of a readable folder, or the caller's own files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(FileListQuery),
    responses((status = 200, description = "Files", body = Vec<FileResponse>))
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let storage = state.storage()?;
    let files = state
        .files()?
        .list(auth.principal(), query.folder, query.password.as_deref())
        .await?;

    let mut rendered = Vec::with_capacity(files.len());
    for file in files {
        rendered.push(file_response(state.pool(), storage, file).await?);
    }
    Ok(Json(ApiResponse::new(rendered)))
}

/// POST /api/files - Upload a file into a folder the caller owns.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body(content = Object, content_type = "multipart/form-data", description = "`folder`, optional `name`, and `file`"),
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Folder owned by someone else"),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Missing fields or oversized file")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let request = UploadForm::read(multipart).await?.into_request()?;
    let file = state.files()?.upload(auth.principal(), request).await?;
    let response = file_response(state.pool(), state.storage()?, file).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// GET /api/files/{id} - File detail.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(("id" = i64, Path, description = "File ID"), PasswordQuery),
    responses(
        (status = 200, description = "File", body = FileResponse),
        (status = 403, description = "Private folder without a valid password"),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(id): Path<i64>,
    Query(query): Query<PasswordQuery>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let (file, _) = state
        .files()?
        .get(auth.principal(), id, query.password.as_deref())
        .await?;
    let response = file_response(state.pool(), state.storage()?, file).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// PATCH /api/files/{id} - Rename a file the caller owns.
#[utoipa::path(
    patch,
    path = "/files/{id}",
    tag = "files",
    params(("id" = i64, Path, description = "File ID")),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "Renamed file", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.files()?.rename(auth.principal(), id, &req.name).await?;
    let response = file_response(state.pool(), state.storage()?, file).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/files/{id} - Delete a file the caller owns.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(("id" = i64, Path, description = "File ID")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.files()?.delete(auth.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
