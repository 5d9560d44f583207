//! Database schema and migrations for Stash.
//!
//! Migrations are applied in order; `schema_version` records how many ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and the follow graph
    r#"
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL COLLATE NOCASE,
    username_key    TEXT NOT NULL UNIQUE,    -- Unicode-folded username
    email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password        TEXT NOT NULL,           -- Argon2 hash
    is_public       INTEGER NOT NULL DEFAULT 1,
    public_password TEXT,                    -- reserved, never read
    profile_photo   TEXT,                    -- media URL
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE follows (
    follower_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    followee_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (follower_id, followee_id),
    CHECK (follower_id <> followee_id)
);

CREATE INDEX idx_follows_followee ON follows(followee_id);
"#,
    // v2: folder tree, likes and unique views
    r#"
CREATE TABLE folders (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL,
    name_key          TEXT NOT NULL,         -- Unicode-folded name
    description       TEXT NOT NULL DEFAULT '',
    owner_id          INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id         INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    is_public         INTEGER NOT NULL DEFAULT 1,
    is_listed_in_feed INTEGER NOT NULL DEFAULT 0,
    folder_code       TEXT NOT NULL UNIQUE,
    password_hash     TEXT,
    created_at        TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_owner_id ON folders(owner_id);
CREATE INDEX idx_folders_parent_id ON folders(parent_id);
CREATE INDEX idx_folders_feed ON folders(is_listed_in_feed, is_public);

CREATE TABLE folder_likes (
    folder_id  INTEGER NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (folder_id, user_id)
);

CREATE INDEX idx_folder_likes_user_id ON folder_likes(user_id);

CREATE TABLE folder_views (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    folder_id INTEGER NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    user_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    viewed_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (folder_id, user_id)
);
"#,
    // v3: uploaded files
    r#"
CREATE TABLE files (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    stored_name  TEXT NOT NULL UNIQUE,     -- UUID-based storage name
    size         INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    folder_id    INTEGER NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    owner_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    uploaded_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_folder_id ON files(folder_id);
CREATE INDEX idx_files_owner_id ON files(owner_id);
"#,
    // v4: comments and folder messages share one table
    r#"
CREATE TABLE annotations (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    kind       TEXT NOT NULL CHECK (kind IN ('folder_comment', 'file_comment', 'folder_message')),
    folder_id  INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    file_id    INTEGER REFERENCES files(id) ON DELETE CASCADE,
    owner_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    text       TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (
        (kind = 'file_comment' AND file_id IS NOT NULL AND folder_id IS NULL)
        OR (kind <> 'file_comment' AND folder_id IS NOT NULL AND file_id IS NULL)
    )
);

CREATE INDEX idx_annotations_folder ON annotations(kind, folder_id);
CREATE INDEX idx_annotations_file ON annotations(file_id);
"#,
    // v5: direct messages
    r#"
CREATE TABLE direct_messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    receiver_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    text        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (sender_id <> receiver_id)
);

CREATE INDEX idx_direct_messages_sender ON direct_messages(sender_id);
CREATE INDEX idx_direct_messages_receiver ON direct_messages(receiver_id);
"#,
    // v6: refresh tokens for the web API
    r#"
CREATE TABLE refresh_tokens (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    revoked_at  TEXT
);

CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id);
CREATE INDEX idx_refresh_tokens_expires_at ON refresh_tokens(expires_at);
"#,
];
