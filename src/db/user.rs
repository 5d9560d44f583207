//! User model for Stash.

/// A registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Username (unique, case-insensitive).
    pub username: String,
    /// Email address, stored lower-cased.
    pub email: String,
    /// Argon2 password hash.
    pub password: String,
    /// Whether the profile is public.
    pub is_public: bool,
    /// Secondary password hash. Stored but not consulted anywhere.
    pub public_password: Option<String>,
    /// Profile photo URL.
    pub profile_photo: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password hash (already hashed).
    pub password: String,
    /// Whether the profile is public.
    pub is_public: bool,
}

impl NewUser {
    /// Create a new user with a public profile.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password_hash.into(),
            is_public: true,
        }
    }

    /// Set profile visibility.
    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// Partial user update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_public: Option<bool>,
    pub profile_photo: Option<Option<String>>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password_hash: impl Into<String>) -> Self {
        self.password = Some(password_hash.into());
        self
    }

    pub fn is_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    pub fn profile_photo(mut self, url: Option<String>) -> Self {
        self.profile_photo = Some(url);
        self
    }

    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.is_public.is_none()
            && self.profile_photo.is_none()
    }
}
