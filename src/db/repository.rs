//! User repository for Stash.

use sqlx::QueryBuilder;

use super::user::{NewUser, User, UserUpdate};
use super::{contains_pattern, fold_key, DbPool};
use crate::{Result, StashError};

/// Reported when a concurrent write claims the same username or email.
pub const USER_CONFLICT: &str = "This username or email is already in use.";

fn write_error(e: sqlx::Error) -> StashError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StashError::Conflict(USER_CONFLICT.to_string())
        }
        other => StashError::Database(other.to_string()),
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password, is_public, public_password, profile_photo, created_at";

/// Repository for user CRUD and lookup operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, username_key, email, password, is_public)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(fold_key(&new_user.username))
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(new_user.is_public)
        .execute(self.pool)
        .await
        .map_err(write_error)?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| StashError::NotFound("User".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(fold_key(email.trim()))
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Check whether a username is taken, optionally ignoring one user.
    ///
    /// Compares Unicode-folded keys, so `Émile` and `émile` collide.
    pub async fn username_taken(&self, username: &str, except_id: Option<i64>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username_key = ? AND id <> ?)",
        )
        .bind(fold_key(username))
        .bind(except_id.unwrap_or(0))
        .fetch_one(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(taken)
    }

    /// Check whether an email is registered, optionally ignoring one user.
    pub async fn email_taken(&self, email: &str, except_id: Option<i64>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? COLLATE NOCASE AND id <> ?)",
        )
        .bind(email)
        .bind(except_id.unwrap_or(0))
        .fetch_one(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(taken)
    }

    /// Folded usernames starting with the folded `prefix`.
    pub async fn usernames_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let key = fold_key(prefix);
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT username_key FROM users WHERE substr(username_key, 1, ?) = ?",
        )
        .bind(key.chars().count() as i64)
        .bind(&key)
        .fetch_all(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(names)
    }

    /// List users ordered by username, optionally filtered by a
    /// case-insensitive substring of username or email.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<User>> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));

        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = contains_pattern(q);
            builder.push(" WHERE username_key LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" ESCAPE '\\' OR lower(email) LIKE ");
            builder.push_bind(pattern);
            builder.push(" ESCAPE '\\'");
        }
        builder.push(" ORDER BY username_key, id");

        let users = builder
            .build_query_as::<User>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(users)
    }

    /// Update a user. Returns `None` if the user does not exist.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref username) = update.username {
            separated.push("username = ");
            separated.push_bind_unseparated(username);
            separated.push("username_key = ");
            separated.push_bind_unseparated(fold_key(username));
        }

        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }

        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }

        if let Some(is_public) = update.is_public {
            separated.push("is_public = ");
            separated.push_bind_unseparated(is_public);
        }

        if let Some(ref photo) = update.profile_photo {
            separated.push("profile_photo = ");
            separated.push_bind_unseparated(photo.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a user by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
