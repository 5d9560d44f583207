//! Folder tree for Stash.
//!
//! Folders form a forest per owner. This module holds the folder
//! repository, the access rules that gate every read and write, likes and
//! views, the derived counts, the two feeds, and the owner operations.

pub mod access;
mod engagement;
pub mod feed;
mod repository;
pub mod service;
mod stats;
mod types;

pub use access::{decide, Access};
pub use engagement::{EngagementRepository, LikeState};
pub use repository::FolderRepository;
pub use service::{ChangeFolder, CreateFolder, FolderQuery};
pub use stats::{folder_stats, tree_counts, FolderStats};
pub use types::{generate_folder_code, Folder, FolderUpdate, NewFolder, FOLDER_CODE_LENGTH};
