//! Repository Layer
//!
//! Data access abstractions and their SQLite implementations.

mod board_bridge;
mod comment_repo;
mod db;
mod profile_repo;
mod tier_repo;
mod traits;


pub use board_bridge::BoardBridge;
pub use comment_repo::CommentRepository;
pub use db::{init_db, DbState, SharedConnection};
pub use profile_repo::ProfileRepository;
pub use tier_repo::TierRepository;
pub use traits::{CommentStore, Repository, TierDocument, TierDocumentStore};
