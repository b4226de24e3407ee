//! Item Entity
//!
//! An anime title placed on the board.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

/// Opaque unique item token; generated ids are never reused
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An anime entry. Field names match the stored tier documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub image_url: String,
}

impl Item {
    /// Create an item with a fresh id
    pub fn new(title: &str, image_url: &str) -> DomainResult<Self> {
        Self::with_id(ItemId::generate(), title, image_url)
    }

    pub fn with_id(id: ItemId, title: &str, image_url: &str) -> DomainResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::InvalidInput("Please enter a title.".to_string()));
        }
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(DomainError::InvalidInput("Please choose an image.".to_string()));
        }
        Ok(Self {
            id,
            title: title.to_string(),
            image_url: image_url.to_string(),
        })
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}
