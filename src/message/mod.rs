//! Direct messages between users.

mod repository;
pub mod service;

pub use repository::{DirectMessage, DirectMessageRepository};
pub use service::Thread;
