//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::dto::*;
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "Stash API", description = "Social file sharing"),
    servers((url = "/api")),
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::register_account,
        handlers::account::get_profile,
        handlers::account::update_own_profile,
        handlers::account::upload_profile_photo,
        handlers::account::list_users,
        handlers::account::get_user,
        handlers::account::get_user_folders,
        handlers::account::follow_user,
        handlers::account::username_suggestions,
        handlers::chat::list_chats,
        handlers::chat::get_chat,
        handlers::chat::send_chat_message,
        handlers::folder::list_folders,
        handlers::folder::create_folder,
        handlers::folder::get_folder,
        handlers::folder::update_folder,
        handlers::folder::delete_folder,
        handlers::folder::popular_feed,
        handlers::folder::following_feed,
        handlers::folder::my_folders,
        handlers::folder::liked_folders,
        handlers::folder::like_folder,
        handlers::file::list_files,
        handlers::file::upload_file,
        handlers::file::get_file,
        handlers::file::update_file,
        handlers::file::delete_file,
        handlers::annotation::list_folder_comments,
        handlers::annotation::create_folder_comment,
        handlers::annotation::list_file_comments,
        handlers::annotation::create_file_comment,
        handlers::annotation::list_folder_messages,
        handlers::annotation::create_folder_message,
    ),
    components(schemas(
        LoginRequest,
        RefreshRequest,
        LogoutRequest,
        RegisterRequest,
        UpdateProfileRequest,
        CreateFolderRequest,
        UpdateFolderRequest,
        UpdateFileRequest,
        FolderCommentRequest,
        FileCommentRequest,
        FolderMessageRequest,
        SendMessageRequest,
        LoginResponse,
        RefreshResponse,
        UserResponse,
        FolderResponse,
        FileResponse,
        AnnotationResponse,
        DirectMessageResponse,
        ThreadResponse,
        FollowResponse,
        LikeResponse,
        SuggestionsResponse,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "accounts", description = "Profiles, users and follows"),
        (name = "chats", description = "Direct messages"),
        (name = "folders", description = "Folders, feeds and likes"),
        (name = "files", description = "Uploaded files"),
        (name = "annotations", description = "Comments and folder messages"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/swagger-ui` backed by `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
