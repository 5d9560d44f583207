//! Stash - a social file-sharing backend.
//!
//! Users keep files in nested folders that can be public, private or
//! password-protected, follow each other, engage with folders through
//! views, likes and comments, and exchange direct messages.

pub mod annotation;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod folder;
pub mod logging;
pub mod message;
pub mod social;
pub mod web;

pub use auth::{
    hash_password, register, suggest_usernames, update_profile, verify_password, PasswordError,
    Principal, ProfileUpdateRequest, RegistrationError, RegistrationRequest, ValidationError,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository, UserUpdate};
pub use error::{Result, StashError};
pub use folder::{decide, Access, Folder, FolderRepository};
