//! Comment and Reply Entities
//!
//! Comments hang off a profile; replies hang off a comment and are stored
//! as their own records so each one can be edited or deleted on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};
use super::profile::{UserId, UserIdentity};

macro_rules! token_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

token_id!(CommentId);
token_id!(ReplyId);

/// Author snapshot taken when the post is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub photo_url: String,
}

impl Author {
    pub fn from_identity(identity: &UserIdentity) -> Self {
        Self {
            id: identity.user_id.clone(),
            name: identity.name_or_anonymous(),
            photo_url: identity.photo_url.clone().unwrap_or_default(),
        }
    }
}

/// Body shared by comments and replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub author: Author,
    pub text: String,
    /// Unix millis
    pub created_at: i64,
    pub is_edited: bool,
    pub is_deleted: bool,
}

impl Post {
    pub fn new(author: Author, text: &str, created_at: i64) -> DomainResult<Self> {
        Ok(Self {
            author,
            text: non_blank(text)?,
            created_at,
            is_edited: false,
            is_deleted: false,
        })
    }

    /// Replace the text; author only, not after deletion
    pub fn edit(&self, editor: &UserId, text: &str) -> DomainResult<Self> {
        self.ensure_author(editor)?;
        if self.is_deleted {
            return Err(DomainError::InvalidInput("A deleted post cannot be edited.".to_string()));
        }
        Ok(Self {
            text: non_blank(text)?,
            is_edited: true,
            ..self.clone()
        })
    }

    /// Soft delete: text cleared, record kept so the thread stays intact
    pub fn delete(&self, editor: &UserId) -> DomainResult<Self> {
        self.ensure_author(editor)?;
        Ok(Self {
            text: String::new(),
            is_deleted: true,
            ..self.clone()
        })
    }

    fn ensure_author(&self, editor: &UserId) -> DomainResult<()> {
        if &self.author.id == editor {
            Ok(())
        } else {
            Err(DomainError::Forbidden("Only the author can change this post.".to_string()))
        }
    }
}

fn non_blank(text: &str) -> DomainResult<String> {
    if text.trim().is_empty() {
        Err(DomainError::InvalidInput("Please enter some text.".to_string()))
    } else {
        Ok(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Profile the comment was left on
    pub profile_id: UserId,
    #[serde(flatten)]
    pub post: Post,
}

impl Comment {
    pub fn new(
        profile_id: UserId,
        author: Author,
        text: &str,
        created_at: i64,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: CommentId::generate(),
            profile_id,
            post: Post::new(author, text, created_at)?,
        })
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: ReplyId,
    pub comment_id: CommentId,
    #[serde(flatten)]
    pub post: Post,
}

impl Reply {
    pub fn new(
        comment_id: CommentId,
        author: Author,
        text: &str,
        created_at: i64,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: ReplyId::generate(),
            comment_id,
            post: Post::new(author, text, created_at)?,
        })
    }
}

impl Entity for Reply {
    type Id = ReplyId;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

/// A comment with its replies in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub comment: Comment,
    pub replies: Vec<Reply>,
}
