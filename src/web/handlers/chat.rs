//! Direct message handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::datetime::to_rfc3339;
use crate::message::service as messages;
use crate::web::dto::{
    ApiResponse, DirectMessageResponse, SendMessageRequest, ThreadResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::{user_response, AppState};

/// GET /api/accounts/chats - One entry per conversation partner, latest first.
#[utoipa::path(
    get,
    path = "/accounts/chats",
    tag = "chats",
    responses(
        (status = 200, description = "Conversation threads", body = Vec<ThreadResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ThreadResponse>>>, ApiError> {
    let threads = messages::threads(state.pool(), auth.user_id()).await?;

    let mut rendered = Vec::with_capacity(threads.len());
    for thread in threads {
        rendered.push(ThreadResponse {
            user: user_response(state.pool(), thread.partner, auth.principal()).await?,
            last_message_at: to_rfc3339(&thread.last_message.created_at),
            last_message: thread.last_message.text,
        });
    }
    Ok(Json(ApiResponse::new(rendered)))
}

/// GET /api/accounts/chats/{user_id} - The conversation with one user, oldest first.
#[utoipa::path(
    get,
    path = "/accounts/chats/{user_id}",
    tag = "chats",
    params(("user_id" = i64, Path, description = "Conversation partner")),
    responses(
        (status = 200, description = "Messages", body = Vec<DirectMessageResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Cannot open a chat with yourself")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<DirectMessageResponse>>>, ApiError> {
    let conversation = messages::conversation(state.pool(), auth.user_id(), user_id).await?;
    Ok(Json(ApiResponse::new(
        conversation.into_iter().map(DirectMessageResponse::from).collect(),
    )))
}

/// POST /api/accounts/chats/{user_id} - Send a direct message.
#[utoipa::path(
    post,
    path = "/accounts/chats/{user_id}",
    tag = "chats",
    params(("user_id" = i64, Path, description = "Receiver")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = DirectMessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Receiver not found"),
        (status = 422, description = "Blank text or message to yourself")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_chat_message(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DirectMessageResponse>>), ApiError> {
    let message = messages::send(state.pool(), auth.user_id(), user_id, &req.text).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(DirectMessageResponse::from(message))),
    ))
}
