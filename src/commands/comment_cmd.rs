//! Comment Commands
//!
//! Guestbook-style threads on profile pages. Posting needs a signed-in
//! user; changing a post needs its author.

use crate::domain::{
    Author, Comment, CommentId, DomainError, DomainResult, Reply, ReplyId, Thread, UserId,
};
use crate::AppState;

use super::board_cmd::require_identity;

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

async fn find_comment(state: &AppState, id: &str) -> DomainResult<Comment> {
    state
        .comments
        .find_comment(&CommentId::from(id))
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("comment {}", id)))
}

async fn find_reply(state: &AppState, id: &str) -> DomainResult<Reply> {
    state
        .comments
        .find_reply(&ReplyId::from(id))
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("reply {}", id)))
}

pub async fn list_threads(state: &AppState, profile_id: &str) -> DomainResult<Vec<Thread>> {
    state.comments.list_threads(&UserId::new(profile_id)).await
}

pub async fn add_comment(state: &AppState, profile_id: &str, text: &str) -> DomainResult<Comment> {
    let identity = require_identity(state)?;
    let comment = Comment::new(
        UserId::new(profile_id),
        Author::from_identity(&identity),
        text,
        now_millis(),
    )?;
    state.comments.create_comment(&comment).await
}

pub async fn edit_comment(state: &AppState, comment_id: &str, text: &str) -> DomainResult<Comment> {
    let identity = require_identity(state)?;
    let comment = find_comment(state, comment_id).await?;
    let edited = Comment {
        post: comment.post.edit(&identity.user_id, text)?,
        ..comment
    };
    state.comments.update_comment(&edited).await
}

pub async fn delete_comment(state: &AppState, comment_id: &str) -> DomainResult<Comment> {
    let identity = require_identity(state)?;
    let comment = find_comment(state, comment_id).await?;
    let deleted = Comment {
        post: comment.post.delete(&identity.user_id)?,
        ..comment
    };
    log::info!("Comment {} deleted by {}", deleted.id, identity.user_id);
    state.comments.update_comment(&deleted).await
}

/// Deleted comments take no new replies
pub async fn add_reply(state: &AppState, comment_id: &str, text: &str) -> DomainResult<Reply> {
    let identity = require_identity(state)?;
    let parent = find_comment(state, comment_id).await?;
    if parent.post.is_deleted {
        return Err(DomainError::InvalidInput(
            "A deleted comment cannot be replied to.".to_string(),
        ));
    }
    let reply = Reply::new(
        parent.id,
        Author::from_identity(&identity),
        text,
        now_millis(),
    )?;
    state.comments.create_reply(&reply).await
}

pub async fn edit_reply(state: &AppState, reply_id: &str, text: &str) -> DomainResult<Reply> {
    let identity = require_identity(state)?;
    let reply = find_reply(state, reply_id).await?;
    let edited = Reply {
        post: reply.post.edit(&identity.user_id, text)?,
        ..reply
    };
    state.comments.update_reply(&edited).await
}

pub async fn delete_reply(state: &AppState, reply_id: &str) -> DomainResult<Reply> {
    let identity = require_identity(state)?;
    let reply = find_reply(state, reply_id).await?;
    let deleted = Reply {
        post: reply.post.delete(&identity.user_id)?,
        ..reply
    };
    log::info!("Reply {} deleted by {}", deleted.id, identity.user_id);
    state.comments.update_reply(&deleted).await
}
