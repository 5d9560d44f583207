//! Authentication and account module for Stash.
//!
//! Password hashing, account registration and profile changes, the request
//! principal, and username suggestions.

mod password;
mod principal;
mod profile;
mod registration;
pub mod suggest;
pub mod validation;

pub use password::{
    hash_password, hash_secret, validate_password, verify_password, PasswordError,
};
pub use principal::Principal;
pub use profile::{update_profile, ProfileUpdateRequest};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use suggest::suggest_usernames;
pub use validation::ValidationError;
