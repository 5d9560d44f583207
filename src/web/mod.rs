//! JSON web API for Stash.
//!
//! Routes live under `/api`; stored payloads are served under the media
//! prefix, with `/health` and `/swagger-ui` alongside.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
