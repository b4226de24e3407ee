//! Board Commands
//!
//! Board editing, drag events and explicit save for the signed-in user.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::dnd::{DragController, DragOutcome, DragPhase};
use crate::domain::{Board, DomainError, DomainResult, Item, ItemId, TierId, UserId, UserIdentity};
use crate::storage::decode_data_url;
use crate::AppState;

/// The board being edited plus its drag session
#[derive(Debug, Default)]
pub struct BoardWorkspace {
    /// User the board was loaded for; `None` before the first load
    pub owner: Option<UserId>,
    pub board: Board,
    pub drag: DragController,
}

/// Image bytes picked by the user
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub tier: TierId,
    pub label: &'static str,
    pub description: String,
    pub color: &'static str,
    pub len: usize,
    /// Add button enabled
    pub can_add: bool,
    /// Shown while an empty tier is hovered
    pub hint: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragFeedback {
    pub phase: DragPhase,
    pub active: Option<Item>,
    pub hovered: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveNotice {
    pub message: String,
    pub updated_at: i64,
}

pub(crate) fn require_identity(state: &AppState) -> DomainResult<UserIdentity> {
    state
        .session
        .current()
        .ok_or_else(|| DomainError::Forbidden("Sign in required".to_string()))
}

fn parse_tier(tier: &str) -> DomainResult<TierId> {
    TierId::from_str(tier)
}

/// Load a user's board into the workspace, replacing whatever was there
pub async fn load_board_for(state: &AppState, identity: &UserIdentity) -> DomainResult<Board> {
    let board = state.bridge.load_own(identity).await?;

    let mut ws = state.workspace.lock().await;
    ws.drag.on_drag_cancel();
    ws.owner = Some(identity.user_id.clone());
    ws.board = board.clone();
    Ok(board)
}

/// Load the signed-in user's board
pub async fn load_my_board(state: &AppState) -> DomainResult<Board> {
    let identity = require_identity(state)?;
    load_board_for(state, &identity).await
}

/// Reload the board on every sign-in until the session context goes away
pub fn watch_session(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let mut subscription = state.session.subscribe();
    tokio::spawn(async move {
        while let Some(identity) = subscription.next_sign_in().await {
            match load_board_for(&state, &identity).await {
                Ok(board) => log::info!(
                    "Loaded board for {} after sign-in ({} items)",
                    identity.user_id,
                    board.len()
                ),
                Err(e) => {
                    log::error!("Failed to load board for {}: {}", identity.user_id, e);
                    let _ = rolling_logger::error(&format!("Board load failed: {}", e));
                }
            }
        }
        log::debug!("Session watcher stopped");
    })
}

pub async fn get_board(state: &AppState) -> Board {
    state.workspace.lock().await.board.clone()
}

/// Tier headers in display order
pub async fn list_tiers(state: &AppState) -> Vec<TierSummary> {
    let ws = state.workspace.lock().await;
    TierId::ALL
        .iter()
        .map(|tier| {
            let desc = tier.descriptor();
            TierSummary {
                tier: *tier,
                label: desc.label,
                description: desc.display_description(),
                color: desc.color,
                len: ws.board.items(*tier).len(),
                can_add: ws.board.can_add(*tier),
                hint: ws.drag.hover_hint(&ws.board, *tier),
            }
        })
        .collect()
}

/// Add an item: validate, upload the cover, then place it
pub async fn add_item(
    state: &AppState,
    tier: &str,
    title: &str,
    image: Option<ImageUpload>,
) -> DomainResult<Item> {
    let tier = parse_tier(tier)?;
    let image = image
        .filter(|img| !img.bytes.is_empty())
        .ok_or_else(|| DomainError::InvalidInput("Please choose an image.".to_string()))?;

    // Fail fast before uploading
    state
        .workspace
        .lock()
        .await
        .board
        .add_item(tier, title, &image.file_name)?;

    let url = state.objects.upload(image.bytes, &image.file_name).await?;

    // The board may have changed while the upload ran
    let mut ws = state.workspace.lock().await;
    let added = ws.board.add_item(tier, title, &url);
    let next = match added {
        Ok(next) => next,
        Err(e) => {
            drop(ws);
            if let Err(cleanup) = state.objects.delete(&url).await {
                log::warn!("Failed to remove orphaned image {}: {}", url, cleanup);
            }
            return Err(e);
        }
    };
    let item = next
        .items(tier)
        .last()
        .cloned()
        .ok_or_else(|| DomainError::Internal("added item missing".to_string()))?;
    ws.board = next;

    log::info!("Added {} to tier {}", item.id, tier);
    Ok(item)
}

/// Add an item whose cover was pasted as a base64 data URL
pub async fn add_item_from_clipboard(
    state: &AppState,
    tier: &str,
    title: &str,
    data: &str,
) -> DomainResult<Item> {
    let (bytes, file_name) = decode_data_url(data)?;
    add_item(state, tier, title, Some(ImageUpload { bytes, file_name })).await
}

/// Remove an item once the user confirmed. Unconfirmed calls do nothing
/// and return `false`.
pub async fn remove_item(state: &AppState, id: &str, confirmed: bool) -> DomainResult<bool> {
    if !confirmed {
        return Ok(false);
    }
    let mut ws = state.workspace.lock().await;
    ws.board = ws.board.remove_item(&ItemId::from(id))?;
    log::info!("Removed item {}", id);
    Ok(true)
}

/// Reorder inside one tier (keyboard or menu driven)
pub async fn move_item_within_tier(
    state: &AppState,
    tier: &str,
    from: usize,
    to: usize,
) -> DomainResult<Board> {
    let tier = parse_tier(tier)?;
    let mut ws = state.workspace.lock().await;
    ws.board = ws.board.move_within_tier(tier, from, to)?;
    Ok(ws.board.clone())
}

pub async fn move_item_to_tier(
    state: &AppState,
    id: &str,
    tier: &str,
    index: Option<usize>,
) -> DomainResult<Board> {
    let tier = parse_tier(tier)?;
    let mut ws = state.workspace.lock().await;
    ws.board = ws.board.move_across_tiers(&ItemId::from(id), tier, index)?;
    Ok(ws.board.clone())
}

// ========================
// Drag events
// ========================

pub async fn drag_start(state: &AppState, item_id: &str) -> DragOutcome {
    let mut ws = state.workspace.lock().await;
    let BoardWorkspace { board, drag, .. } = &mut *ws;
    drag.on_drag_start(board, item_id)
}

pub async fn drag_over(state: &AppState, target_id: Option<&str>) -> DragOutcome {
    state.workspace.lock().await.drag.on_drag_over(target_id)
}

/// Resolve a drop. A refused move comes back as an error for the notice.
pub async fn drag_end(state: &AppState, target_id: Option<&str>) -> DomainResult<DragOutcome> {
    let mut ws = state.workspace.lock().await;
    let BoardWorkspace { board, drag, .. } = &mut *ws;
    match drag.on_drag_end(board, target_id) {
        DragOutcome::Rejected(err) => Err(err),
        outcome => Ok(outcome),
    }
}

pub async fn drag_cancel(state: &AppState) -> DragOutcome {
    state.workspace.lock().await.drag.on_drag_cancel()
}

pub async fn drag_feedback(state: &AppState) -> DragFeedback {
    let ws = state.workspace.lock().await;
    DragFeedback {
        phase: ws.drag.phase(),
        active: ws.drag.active_item(&ws.board).cloned(),
        hovered: ws.drag.hovered().map(str::to_string),
    }
}

// ========================
// Save
// ========================

/// Persist the board as it is now. The board is snapshotted first so
/// editing can continue while the write is in flight.
pub async fn save_board(state: &AppState) -> DomainResult<SaveNotice> {
    let (owner, board) = {
        let ws = state.workspace.lock().await;
        (ws.owner.clone(), ws.board.clone())
    };
    let owner = owner.ok_or_else(|| DomainError::Forbidden("Sign in required".to_string()))?;
    if state.session.current_user().as_ref() != Some(&owner) {
        return Err(DomainError::Forbidden(
            "This board belongs to another session".to_string(),
        ));
    }

    match state.bridge.save(&owner, &board).await {
        Ok(updated_at) => Ok(SaveNotice {
            message: "Saved!".to_string(),
            updated_at,
        }),
        Err(e) => {
            log::error!("Save failed for {}: {}", owner, e);
            let _ = rolling_logger::error(&format!("Save failed: {}", e));
            Err(e)
        }
    }
}
