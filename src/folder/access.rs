//! Folder access decisions.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. a public folder is readable by anyone;
//! 2. the authenticated owner may read and write;
//! 3. a non-empty password that verifies against the folder's hash grants
//!    read access only;
//! 4. everything else is denied.

use crate::auth::{verify_password, Principal};
use crate::StashError;

use super::types::Folder;

/// Reason reported when a folder read is denied.
pub const FOLDER_DENIED: &str = "This folder is private. Password required or incorrect.";

/// Reason reported when a file read is denied.
pub const FILE_DENIED: &str = "This file belongs to a private folder.";

/// Reason reported when a non-owner attempts a write.
pub const NOT_OWNER: &str = "You do not own this folder.";

/// Reason reported when a folder message is posted without public or owner access.
pub const ENGAGE_DENIED: &str = "You cannot interact with this private folder.";

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Authenticated owner: read and write.
    Owner,
    /// Read only.
    Read,
    Denied,
}

impl Access {
    pub fn can_read(self) -> bool {
        !matches!(self, Access::Denied)
    }

    pub fn can_write(self) -> bool {
        matches!(self, Access::Owner)
    }
}

/// Decide what `principal` may do with `folder`.
///
/// The owner is reported as [`Access::Owner`] even on a public folder so
/// that callers can tell write rights apart from plain reads.
pub fn decide(principal: Principal, folder: &Folder, password: Option<&str>) -> Access {
    if principal.is(folder.owner_id) {
        return Access::Owner;
    }
    if folder.is_public {
        return Access::Read;
    }
    match (folder.password_hash.as_deref(), password) {
        (Some(hash), Some(supplied)) if !supplied.is_empty() => {
            if verify_password(supplied, hash).is_ok() {
                Access::Read
            } else {
                Access::Denied
            }
        }
        _ => Access::Denied,
    }
}

/// Require read access to a folder.
pub fn require_read(
    principal: Principal,
    folder: &Folder,
    password: Option<&str>,
) -> Result<Access, StashError> {
    let access = decide(principal, folder, password);
    if access.can_read() {
        Ok(access)
    } else {
        Err(StashError::Permission(FOLDER_DENIED.to_string()))
    }
}

/// Require read access to a file through its folder.
pub fn require_file_read(
    principal: Principal,
    folder: &Folder,
    password: Option<&str>,
) -> Result<Access, StashError> {
    let access = decide(principal, folder, password);
    if access.can_read() {
        Ok(access)
    } else {
        Err(StashError::Permission(FILE_DENIED.to_string()))
    }
}

/// Require strict ownership. A password or a public flag never satisfies this.
///
/// Guards every write: update, delete, child creation, uploads, likes and
/// comments.
pub fn require_owner(principal: Principal, folder: &Folder) -> Result<(), StashError> {
    match principal {
        Principal::Anonymous => Err(StashError::Auth("authentication required".to_string())),
        Principal::User(_) if principal.is(folder.owner_id) => Ok(()),
        Principal::User(_) => Err(StashError::Permission(NOT_OWNER.to_string())),
    }
}

/// Require the right to post on a folder's message board: an authenticated
/// principal and a public or owned folder.
pub fn require_engage(principal: Principal, folder: &Folder) -> Result<(), StashError> {
    if !principal.is_authenticated() {
        return Err(StashError::Auth("authentication required".to_string()));
    }
    if folder.is_public || principal.is(folder.owner_id) {
        Ok(())
    } else {
        Err(StashError::Permission(ENGAGE_DENIED.to_string()))
    }
}

/// Whether the recursive counts of `folder` may be shown to `principal`.
pub fn counts_visible(principal: Principal, folder: &Folder) -> bool {
    folder.is_public || principal.is(folder.owner_id)
}
