//! Token issuance and account registration.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::validation::normalize_email;
use crate::auth::{register, verify_password, Principal, RegistrationRequest};
use crate::datetime::to_sqlite;
use crate::db::{NewRefreshToken, RefreshTokenRepository, User, UserRepository};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;

use super::{user_response, AppState};

/// Issue an access token and store a fresh refresh token for `user`.
async fn issue_tokens(state: &AppState, user: &User) -> Result<(String, String), ApiError> {
    let access_token = state.generate_access_token(user.id, &user.username)?;
    let refresh_token = state.generate_refresh_token();

    let expires_at =
        chrono::Utc::now() + chrono::Duration::days(state.refresh_token_expiry as i64);
    RefreshTokenRepository::new(state.pool())
        .create(&NewRefreshToken {
            user_id: user.id,
            token: refresh_token.clone(),
            expires_at: to_sqlite(&expires_at),
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to store refresh token: {}", e);
            ApiError::internal("Failed to create session")
        })?;

    Ok((access_token, refresh_token))
}

/// POST /api/token - Log in with email and password.
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let email = normalize_email(&req.email);
    let user = UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("No active account found with this email."))?;

    if verify_password(&req.password, &user.password).is_err() {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");

    let user = user_response(state.pool(), user, Principal::Anonymous).await?;
    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        refresh_token,
        expires_in: state.access_token_expiry,
        user,
    })))
}

/// POST /api/token/refresh - Exchange a refresh token for a new pair.
#[utoipa::path(
    post,
    path = "/token/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = RefreshResponse),
        (status = 401, description = "Invalid, expired or revoked refresh token")
    )
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let tokens = RefreshTokenRepository::new(state.pool());
    let stored = tokens
        .get_valid_token(&req.refresh_token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    // Losing the race to another refresh with the same token counts as invalid.
    if !tokens.revoke(&stored.token).await? {
        return Err(ApiError::unauthorized("Invalid or expired refresh token"));
    }

    let user = UserRepository::new(state.pool())
        .get_by_id(stored.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let (access_token, refresh_token) = issue_tokens(&state, &user).await?;
    tracing::debug!(user_id = user.id, "Token pair rotated");

    Ok(Json(ApiResponse::new(RefreshResponse {
        access_token,
        refresh_token,
        expires_in: state.access_token_expiry,
    })))
}

/// POST /api/token/logout - Revoke a refresh token.
///
/// Unknown tokens are accepted silently.
#[utoipa::path(
    post,
    path = "/token/logout",
    tag = "auth",
    request_body = LogoutRequest,
    responses((status = 204, description = "Refresh token revoked"))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    if RefreshTokenRepository::new(state.pool())
        .revoke(&req.refresh_token)
        .await?
    {
        tracing::info!("Refresh token revoked");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/accounts/register - Create an account.
#[utoipa::path(
    post,
    path = "/accounts/register",
    tag = "accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 422, description = "Invalid or duplicate username, email or password")
    )
)]
pub async fn register_account(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = register(
        state.pool(),
        RegistrationRequest::new(req.username, req.email, req.password),
    )
    .await?;

    let user = user_response(state.pool(), user, Principal::Anonymous).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(user))))
}
