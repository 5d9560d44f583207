//! Router configuration for the web API.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::file::FileStorage;

use super::handlers::*;
use super::middleware::{
    api_rate_limit, create_cors_layer, jwt_auth, login_rate_limit, security_headers, JwtState,
    RateLimitState,
};

/// Headroom for multipart framing and text fields on top of the payload limit.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the `/api` router with its middleware stack.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let upload_limit = DefaultBodyLimit::max(
        usize::try_from(app_state.max_upload_size)
            .unwrap_or(usize::MAX)
            .saturating_add(MULTIPART_OVERHEAD),
    );

    let login_limiter = rate_limit.clone();
    let token_routes = Router::new()
        .route("/", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .layer(middleware::from_fn(move |req, next| {
            login_rate_limit(login_limiter.clone(), req, next)
        }));

    let account_routes = Router::new()
        .route("/register", post(register_account))
        .route("/profile", get(get_profile).patch(update_own_profile))
        .route(
            "/profile/photo",
            post(upload_profile_photo).layer(upload_limit.clone()),
        )
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/folders", get(get_user_folders))
        .route("/users/:id/follow", post(follow_user))
        .route("/username-suggestions", get(username_suggestions))
        .route("/chats", get(list_chats))
        .route("/chats/:user_id", get(get_chat).post(send_chat_message));

    let folder_routes = Router::new()
        .route("/", get(list_folders).post(create_folder))
        .route("/feed", get(popular_feed))
        .route("/following-feed", get(following_feed))
        .route("/mine", get(my_folders))
        .route("/liked", get(liked_folders))
        .route(
            "/:id",
            get(get_folder).patch(update_folder).delete(delete_folder),
        )
        .route("/:id/like", post(like_folder));

    let file_routes = Router::new()
        .route("/", get(list_files).post(upload_file).layer(upload_limit))
        .route("/:id", get(get_file).patch(update_file).delete(delete_file));

    let api_routes = Router::new()
        .nest("/token", token_routes)
        .nest("/accounts", account_routes)
        .nest("/folders", folder_routes)
        .nest("/files", file_routes)
        .route(
            "/folder-comments",
            get(list_folder_comments).post(create_folder_comment),
        )
        .route(
            "/file-comments",
            get(list_file_comments).post(create_file_comment),
        )
        .route(
            "/folder-messages",
            get(list_folder_messages).post(create_folder_message),
        )
        .layer(middleware::from_fn(move |req, next| {
            api_rate_limit(rate_limit.clone(), req, next)
        }));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    jwt_auth(jwt_state.clone(), req, next)
                }))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Serve stored payloads under the media URL prefix.
pub fn create_media_router(storage: &FileStorage, url_prefix: &str) -> Router {
    Router::new().nest_service(url_prefix, ServeDir::new(storage.base_path()))
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}
