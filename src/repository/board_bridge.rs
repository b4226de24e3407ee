//! Board Persistence Bridge
//!
//! Maps a user's board to per-tier documents and back. Saving is an
//! explicit action; the in-memory board is never touched by a save.

use std::sync::Arc;

use super::traits::{Repository, TierDocument, TierDocumentStore};
use crate::domain::{Board, DomainError, DomainResult, TierId, UserId, UserIdentity, UserProfile};

pub struct BoardBridge {
    tiers: Arc<dyn TierDocumentStore>,
    profiles: Arc<dyn Repository<UserProfile>>,
}

impl BoardBridge {
    pub fn new(
        tiers: Arc<dyn TierDocumentStore>,
        profiles: Arc<dyn Repository<UserProfile>>,
    ) -> Self {
        Self { tiers, profiles }
    }

    /// Create the profile record the first time an identity is seen
    pub async fn ensure_profile(&self, identity: &UserIdentity) -> DomainResult<UserProfile> {
        if let Some(existing) = self.profiles.find_by_id(identity.user_id.clone()).await? {
            return Ok(existing);
        }
        let profile = UserProfile::from_identity(identity, chrono::Utc::now().timestamp_millis());
        log::info!("Creating profile for {}", profile.user_id);
        self.profiles.create(&profile).await
    }

    /// Board of a signed-in user; their profile is created if missing
    pub async fn load_own(&self, identity: &UserIdentity) -> DomainResult<Board> {
        self.ensure_profile(identity).await?;
        self.load(&identity.user_id).await
    }

    /// Assemble a board from tier documents. Missing documents are empty tiers.
    pub async fn load(&self, user: &UserId) -> DomainResult<Board> {
        let mut board = Board::new();
        for tier in TierId::ALL {
            if let Some(doc) = self.tiers.load_tier(user, tier).await? {
                board = board.with_tier_items(tier, doc.items);
            }
        }
        log::debug!("Loaded board for {} ({} items)", user, board.len());
        Ok(board)
    }

    /// Read-only view of another user's profile and board
    pub async fn load_public(&self, user: &UserId) -> DomainResult<(UserProfile, Board)> {
        let profile = self
            .profiles
            .find_by_id(user.clone())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {}", user)))?;
        let board = self.load(user).await?;
        Ok((profile, board))
    }

    /// Write every tier, stamping one `updated_at`. Returns the stamp.
    pub async fn save(&self, user: &UserId, board: &Board) -> DomainResult<i64> {
        let updated_at = chrono::Utc::now().timestamp_millis();
        let docs: Vec<(TierId, TierDocument)> = board
            .tiers()
            .iter()
            .map(|slot| {
                (
                    slot.tier,
                    TierDocument {
                        items: slot.items.clone(),
                        updated_at,
                    },
                )
            })
            .collect();

        self.tiers.save_all(user, &docs).await?;
        log::info!("Saved board for {} ({} items)", user, board.len());
        Ok(updated_at)
    }

    pub async fn list_profiles(&self) -> DomainResult<Vec<UserProfile>> {
        self.profiles.list().await
    }
}
