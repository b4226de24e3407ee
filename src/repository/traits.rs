//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, a remote document store, etc.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Comment, CommentId, DomainResult, Entity, Item, Reply, ReplyId, Thread, TierId, UserId,
};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> DomainResult<T>;
}

/// Stored contents of one tier for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDocument {
    pub items: Vec<Item>,
    /// Unix millis of the last save
    pub updated_at: i64,
}

/// Per-tier document storage. One tier document is the unit of persistence;
/// a missing document means the tier is empty.
#[async_trait]
pub trait TierDocumentStore: Send + Sync {
    async fn load_tier(&self, user: &UserId, tier: TierId) -> DomainResult<Option<TierDocument>>;

    /// Overwrite a tier document (last write wins)
    async fn save_tier(&self, user: &UserId, tier: TierId, doc: &TierDocument) -> DomainResult<()>;

    /// Save several tier documents; backends with transactions override this
    async fn save_all(&self, user: &UserId, docs: &[(TierId, TierDocument)]) -> DomainResult<()> {
        for (tier, doc) in docs {
            self.save_tier(user, *tier, doc).await?;
        }
        Ok(())
    }
}

/// Comment threads on profiles. Replies are addressed individually.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, comment: &Comment) -> DomainResult<Comment>;

    async fn find_comment(&self, id: &CommentId) -> DomainResult<Option<Comment>>;

    async fn update_comment(&self, comment: &Comment) -> DomainResult<Comment>;

    /// Comments on a profile, newest first
    async fn list_comments(&self, profile: &UserId) -> DomainResult<Vec<Comment>>;

    /// Fails with NotFound when the parent comment does not exist
    async fn create_reply(&self, reply: &Reply) -> DomainResult<Reply>;

    async fn find_reply(&self, id: &ReplyId) -> DomainResult<Option<Reply>>;

    async fn update_reply(&self, reply: &Reply) -> DomainResult<Reply>;

    /// Replies to a comment, oldest first
    async fn list_replies(&self, comment: &CommentId) -> DomainResult<Vec<Reply>>;

    async fn list_threads(&self, profile: &UserId) -> DomainResult<Vec<Thread>> {
        let mut threads = Vec::new();
        for comment in self.list_comments(profile).await? {
            let replies = self.list_replies(&comment.id()).await?;
            threads.push(Thread { comment, replies });
        }
        Ok(threads)
    }
}
