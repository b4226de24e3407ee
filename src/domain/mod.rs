//! Domain Layer
//!
//! Contains all domain entities and core rules.
//! This layer does no I/O.

mod entity;
mod tier;
mod item;
mod board;
mod profile;
mod comment;

pub use entity::{Entity, DomainError, DomainResult};
pub use tier::{registry, Capacity, TierDescriptor, TierId};
pub use item::{Item, ItemId};
pub use board::{Board, TierSlot};
pub use profile::{UserId, UserIdentity, UserProfile, ANONYMOUS_NAME};
pub use comment::{Author, Comment, CommentId, Post, Reply, ReplyId, Thread};
