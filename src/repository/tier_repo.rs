//! Tier Document Repository
//!
//! One row per (user, tier). Items are stored as a JSON array in tier order.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::db::not_initialized;
use super::traits::{TierDocument, TierDocumentStore};
use crate::domain::{DomainResult, Item, TierId, UserId};

/// SQLite implementation of the tier document store
pub struct TierRepository {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl TierRepository {
    pub fn new(conn: Arc<Mutex<Option<Connection>>>) -> Self {
        Self { conn }
    }
}

const UPSERT: &str = "INSERT INTO tier_documents (user_id, tier, items, updated_at)
     VALUES (?, ?, ?, ?)
     ON CONFLICT(user_id, tier)
     DO UPDATE SET items = excluded.items, updated_at = excluded.updated_at";

#[async_trait]
impl TierDocumentStore for TierRepository {
    async fn load_tier(&self, user: &UserId, tier: TierId) -> DomainResult<Option<TierDocument>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT items, updated_at FROM tier_documents WHERE user_id = ? AND tier = ?",
                params![user.as_str(), tier.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((items, updated_at)) => {
                let items: Vec<Item> = serde_json::from_str(&items)?;
                Ok(Some(TierDocument { items, updated_at }))
            }
            None => Ok(None),
        }
    }

    async fn save_tier(&self, user: &UserId, tier: TierId, doc: &TierDocument) -> DomainResult<()> {
        let items = serde_json::to_string(&doc.items)?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.execute(UPSERT, params![user.as_str(), tier.as_str(), items, doc.updated_at])?;
        Ok(())
    }

    /// All tiers in one transaction: a failed save leaves every tier as it was
    async fn save_all(&self, user: &UserId, docs: &[(TierId, TierDocument)]) -> DomainResult<()> {
        let encoded = docs
            .iter()
            .map(|(tier, doc)| -> DomainResult<_> {
                Ok((*tier, serde_json::to_string(&doc.items)?, doc.updated_at))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;

        let tx = conn.transaction()?;
        for (tier, items, updated_at) in &encoded {
            tx.execute(UPSERT, params![user.as_str(), tier.as_str(), items, updated_at])?;
        }
        tx.commit()?;

        log::debug!("Saved {} tier documents for {}", encoded.len(), user);
        Ok(())
    }
}
