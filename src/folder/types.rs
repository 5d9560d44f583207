//! Folder types.

use uuid::Uuid;

/// Length of a folder code.
pub const FOLDER_CODE_LENGTH: usize = 8;

/// A folder in a user's tree.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    /// Parent folder (None for a root).
    pub parent_id: Option<i64>,
    pub is_public: bool,
    pub is_listed_in_feed: bool,
    /// Globally unique shareable code, fixed at creation.
    pub folder_code: String,
    /// Argon2 hash of the access password, if one is set.
    pub password_hash: Option<String>,
    pub created_at: String,
}

impl Folder {
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Generate a candidate folder code: eight upper-case hex digits from a v4
/// UUID.
pub fn generate_folder_code() -> String {
    let mut code = Uuid::new_v4().simple().to_string();
    code.truncate(FOLDER_CODE_LENGTH);
    code.make_ascii_uppercase();
    code
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub parent_id: Option<i64>,
    pub is_public: bool,
    pub is_listed_in_feed: bool,
    pub password_hash: Option<String>,
}

impl NewFolder {
    /// A public, unlisted root folder with no password.
    pub fn new(owner_id: i64, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            owner_id,
            parent_id: None,
            is_public: true,
            is_listed_in_feed: false,
            password_hash: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_listed_in_feed(mut self, listed: bool) -> Self {
        self.is_listed_in_feed = listed;
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }
}

/// Builder for updating a folder. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Option<i64>>,
    pub is_public: Option<bool>,
    pub is_listed_in_feed: Option<bool>,
    /// `Some(None)` clears the password.
    pub password_hash: Option<Option<String>>,
}

impl FolderUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parent_id(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    pub fn is_listed_in_feed(mut self, listed: bool) -> Self {
        self.is_listed_in_feed = Some(listed);
        self
    }

    pub fn password_hash(mut self, hash: Option<String>) -> Self {
        self.password_hash = Some(hash);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.parent_id.is_none()
            && self.is_public.is_none()
            && self.is_listed_in_feed.is_none()
            && self.password_hash.is_none()
    }
}
