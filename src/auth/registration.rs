//! Account registration.

use thiserror::Error;
use tracing::info;

use crate::auth::validation::{
    normalize_email, normalize_username, validate_email, validate_username, ValidationError,
};
use crate::auth::{hash_password, PasswordError};
use crate::db::{DbPool, NewUser, User, UserRepository};

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("This username is already taken.")]
    UsernameTaken,

    #[error("This email is already registered.")]
    EmailTaken,

    #[error("{0}")]
    Password(#[from] PasswordError),

    /// Lost a race with a concurrent registration.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

impl RegistrationError {
    /// Input field the error relates to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            RegistrationError::Validation(e) => Some(e.field()),
            RegistrationError::UsernameTaken => Some("username"),
            RegistrationError::EmailTaken => Some("email"),
            RegistrationError::Password(_) => Some("password"),
            RegistrationError::Conflict(_) | RegistrationError::Database(_) => None,
        }
    }
}

impl From<crate::StashError> for RegistrationError {
    fn from(e: crate::StashError) -> Self {
        match e {
            crate::StashError::Conflict(msg) => RegistrationError::Conflict(msg),
            other => RegistrationError::Database(other.to_string()),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationRequest {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Register a new account.
///
/// The username is trimmed, the email trimmed and lower-cased; both must be
/// unique ignoring case.
pub async fn register(pool: &DbPool, request: RegistrationRequest) -> Result<User, RegistrationError> {
    let username = normalize_username(&request.username);
    let email = normalize_email(&request.email);

    validate_username(&username)?;
    validate_email(&email)?;

    let repo = UserRepository::new(pool);
    if repo.username_taken(&username, None).await? {
        return Err(RegistrationError::UsernameTaken);
    }
    if repo.email_taken(&email, None).await? {
        return Err(RegistrationError::EmailTaken);
    }

    let password_hash = hash_password(&request.password)?;
    let user = repo
        .create(&NewUser::new(&username, &email, password_hash))
        .await?;

    info!(username = %user.username, user_id = user.id, "New user registered");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify_password;
    use crate::Database;

    #[tokio::test]
    async fn test_register_normalizes_input() {
        let db = Database::open_in_memory().await.unwrap();

        let user = register(
            db.pool(),
            RegistrationRequest::new("  Alice ", " Alice@Example.COM ", "password123"),
        )
        .await
        .unwrap();

        assert_eq!(user.username, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert!(user.is_public);
        assert!(verify_password("password123", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicates_ignore_case() {
        let db = Database::open_in_memory().await.unwrap();
        register(
            db.pool(),
            RegistrationRequest::new("alice", "alice@example.com", "password123"),
        )
        .await
        .unwrap();

        let err = register(
            db.pool(),
            RegistrationRequest::new("ALICE", "other@example.com", "password123"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::UsernameTaken));
        assert_eq!(err.field(), Some("username"));
        assert_eq!(err.to_string(), "This username is already taken.");

        let err = register(
            db.pool(),
            RegistrationRequest::new("bob", "ALICE@example.com", "password123"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::EmailTaken));
        assert_eq!(err.field(), Some("email"));
    }

    #[tokio::test]
    async fn test_register_folds_non_ascii_case() {
        let db = Database::open_in_memory().await.unwrap();
        register(
            db.pool(),
            RegistrationRequest::new("Émile", "emile@example.com", "password123"),
        )
        .await
        .unwrap();

        let err = register(
            db.pool(),
            RegistrationRequest::new("émile", "other@example.com", "password123"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let db = Database::open_in_memory().await.unwrap();

        let err = register(
            db.pool(),
            RegistrationRequest::new("   ", "a@example.com", "password123"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.field(), Some("username"));

        let err = register(
            db.pool(),
            RegistrationRequest::new("alice", "a@example.com", "short"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::Password(PasswordError::TooShort)));
    }
}
