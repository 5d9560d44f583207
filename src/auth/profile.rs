//! Profile changes for an existing account.

use tracing::info;

use crate::auth::registration::RegistrationError;
use crate::auth::validation::{normalize_email, normalize_username, validate_email, validate_username};
use crate::db::{DbPool, User, UserRepository, UserUpdate};

/// Requested profile changes. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_public: Option<bool>,
}

/// Apply a profile update under the same uniqueness rules as registration.
pub async fn update_profile(
    pool: &DbPool,
    user_id: i64,
    request: ProfileUpdateRequest,
) -> Result<User, RegistrationError> {
    let repo = UserRepository::new(pool);
    let mut update = UserUpdate::new();

    if let Some(username) = request.username.as_deref().map(normalize_username) {
        validate_username(&username)?;
        if repo.username_taken(&username, Some(user_id)).await? {
            return Err(RegistrationError::UsernameTaken);
        }
        update = update.username(username);
    }

    if let Some(email) = request.email.as_deref().map(normalize_email) {
        validate_email(&email)?;
        if repo.email_taken(&email, Some(user_id)).await? {
            return Err(RegistrationError::EmailTaken);
        }
        update = update.email(email);
    }

    if let Some(is_public) = request.is_public {
        update = update.is_public(is_public);
    }

    let user = repo
        .update(user_id, &update)
        .await?
        .ok_or_else(|| RegistrationError::Database("user disappeared during update".into()))?;

    info!(user_id, "Profile updated");
    Ok(user)
}
