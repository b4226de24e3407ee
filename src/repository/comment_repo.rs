//! Comment Repository
//!
//! Comments and replies live in separate tables; each reply is its own
//! row so edits and deletes touch one record.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::db::not_initialized;
use super::traits::CommentStore;
use crate::domain::{
    Author, Comment, CommentId, DomainError, DomainResult, Post, Reply, ReplyId, UserId,
};

pub struct CommentRepository {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl CommentRepository {
    pub fn new(conn: Arc<Mutex<Option<Connection>>>) -> Self {
        Self { conn }
    }
}

const COMMENT_COLUMNS: &str = "id, profile_id, author_id, author_name, author_photo, \
                               text, created_at, is_edited, is_deleted";
const REPLY_COLUMNS: &str = "id, comment_id, author_id, author_name, author_photo, \
                             text, created_at, is_edited, is_deleted";

#[async_trait]
impl CommentStore for CommentRepository {
    async fn create_comment(&self, comment: &Comment) -> DomainResult<Comment> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let post = &comment.post;
        conn.execute(
            &format!(
                "INSERT INTO comments ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                COMMENT_COLUMNS
            ),
            params![
                comment.id.as_str(),
                comment.profile_id.as_str(),
                post.author.id.as_str(),
                post.author.name,
                post.author.photo_url,
                post.text,
                post.created_at,
                post.is_edited,
                post.is_deleted
            ],
        )?;
        Ok(comment.clone())
    }

    async fn find_comment(&self, id: &CommentId) -> DomainResult<Option<Comment>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let comment = conn
            .query_row(
                &format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS),
                params![id.as_str()],
                row_to_comment,
            )
            .optional()?;
        Ok(comment)
    }

    async fn update_comment(&self, comment: &Comment) -> DomainResult<Comment> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute(
            "UPDATE comments SET text = ?, is_edited = ?, is_deleted = ? WHERE id = ?",
            params![
                comment.post.text,
                comment.post.is_edited,
                comment.post.is_deleted,
                comment.id.as_str()
            ],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Comment {}", comment.id)));
        }
        Ok(comment.clone())
    }

    async fn list_comments(&self, profile: &UserId) -> DomainResult<Vec<Comment>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM comments WHERE profile_id = ? ORDER BY created_at DESC, rowid DESC",
            COMMENT_COLUMNS
        ))?;
        let comments = stmt
            .query_map(params![profile.as_str()], row_to_comment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    async fn create_reply(&self, reply: &Reply) -> DomainResult<Reply> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let parent: Option<String> = conn
            .query_row(
                "SELECT id FROM comments WHERE id = ?",
                params![reply.comment_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if parent.is_none() {
            return Err(DomainError::NotFound(format!("Comment {}", reply.comment_id)));
        }

        let post = &reply.post;
        conn.execute(
            &format!(
                "INSERT INTO replies ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                REPLY_COLUMNS
            ),
            params![
                reply.id.as_str(),
                reply.comment_id.as_str(),
                post.author.id.as_str(),
                post.author.name,
                post.author.photo_url,
                post.text,
                post.created_at,
                post.is_edited,
                post.is_deleted
            ],
        )?;
        Ok(reply.clone())
    }

    async fn find_reply(&self, id: &ReplyId) -> DomainResult<Option<Reply>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let reply = conn
            .query_row(
                &format!("SELECT {} FROM replies WHERE id = ?", REPLY_COLUMNS),
                params![id.as_str()],
                row_to_reply,
            )
            .optional()?;
        Ok(reply)
    }

    async fn update_reply(&self, reply: &Reply) -> DomainResult<Reply> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute(
            "UPDATE replies SET text = ?, is_edited = ?, is_deleted = ? WHERE id = ?",
            params![
                reply.post.text,
                reply.post.is_edited,
                reply.post.is_deleted,
                reply.id.as_str()
            ],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Reply {}", reply.id)));
        }
        Ok(reply.clone())
    }

    async fn list_replies(&self, comment: &CommentId) -> DomainResult<Vec<Reply>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM replies WHERE comment_id = ? ORDER BY created_at ASC, rowid ASC",
            REPLY_COLUMNS
        ))?;
        let replies = stmt
            .query_map(params![comment.as_str()], row_to_reply)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(replies)
    }
}

/// Columns 2..=8 are shared by both tables
fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        author: Author {
            id: UserId::new(row.get::<_, String>(2)?),
            name: row.get(3)?,
            photo_url: row.get(4)?,
        },
        text: row.get(5)?,
        created_at: row.get(6)?,
        is_edited: row.get(7)?,
        is_deleted: row.get(8)?,
    })
}

fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId::from(row.get::<_, String>(0)?.as_str()),
        profile_id: UserId::new(row.get::<_, String>(1)?),
        post: row_to_post(row)?,
    })
}

fn row_to_reply(row: &rusqlite::Row) -> rusqlite::Result<Reply> {
    Ok(Reply {
        id: ReplyId::from(row.get::<_, String>(0)?.as_str()),
        comment_id: CommentId::from(row.get::<_, String>(1)?.as_str()),
        post: row_to_post(row)?,
    })
}
