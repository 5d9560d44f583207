//! Input validation for account fields.

use thiserror::Error;

/// Maximum username length, in characters.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Punctuation allowed in usernames besides letters and digits.
const USERNAME_PUNCTUATION: &[char] = &['_', '.', '@', '+', '-'];

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("This field may not be blank.")]
    UsernameEmpty,

    #[error("Ensure this field has no more than {MAX_USERNAME_LENGTH} characters.")]
    UsernameTooLong,

    #[error("Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.")]
    UsernameInvalidChars,

    #[error("This field may not be blank.")]
    EmailEmpty,

    #[error("Ensure this field has no more than {MAX_EMAIL_LENGTH} characters.")]
    EmailTooLong,

    #[error("Enter a valid email address.")]
    EmailInvalidFormat,
}

impl ValidationError {
    /// Name of the input field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UsernameEmpty
            | ValidationError::UsernameTooLong
            | ValidationError::UsernameInvalidChars => "username",
            ValidationError::EmailEmpty
            | ValidationError::EmailTooLong
            | ValidationError::EmailInvalidFormat => "email",
        }
    }
}

/// Usernames are compared case-insensitively but stored as typed, minus
/// surrounding whitespace.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_string()
}

/// Emails are stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an already-normalized username.
///
/// ```
/// use stash::auth::validation::validate_username;
///
/// assert!(validate_username("john_doe").is_ok());
/// assert!(validate_username("").is_err());
/// assert!(validate_username("john doe").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || USERNAME_PUNCTUATION.contains(&c))
    {
        return Err(ValidationError::UsernameInvalidChars);
    }
    Ok(())
}

/// Validate an already-normalized email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(ValidationError::EmailInvalidFormat)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(ValidationError::EmailInvalidFormat);
    }
    Ok(())
}
