//! Drag Interaction Controller
//!
//! Finite-state machine: Idle -> Dragging (hovering any number of times)
//! -> resolving on drop -> Idle. A drop is applied to the board all at once
//! or not at all; the session is cleared whatever the outcome.
//!
//! Starting a drag while one is active cancels the active one first.

use log::{debug, warn};

use super::{AbortReason, DragOutcome, DragPhase, DragState, DropTarget};
use crate::domain::{Board, Item, ItemId, TierId};

/// Text shown inside an empty tier while it is hovered
pub const DROP_HINT: &str = "Drop here";

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

enum Resolution {
    Apply(Board, DragOutcome),
    Skip(DragOutcome),
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn phase(&self) -> DragPhase {
        match &self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Dragging { over: None, .. } => DragPhase::Dragging,
            DragState::Dragging { over: Some(_), .. } => DragPhase::Hovering,
        }
    }

    pub fn active_id(&self) -> Option<&ItemId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { active, .. } => Some(active),
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { over, .. } => over.as_deref(),
        }
    }

    pub fn on_drag_start(&mut self, board: &Board, item_id: &str) -> DragOutcome {
        let id = ItemId::from(item_id);
        if !board.contains(&id) {
            warn!("[DND] Drag start on unknown item {}", item_id);
            return DragOutcome::Ignored;
        }

        let dragging = DragState::Dragging {
            active: id.clone(),
            over: None,
        };
        match std::mem::replace(&mut self.state, dragging) {
            DragState::Idle => {
                debug!("[DND] Drag start: {}", id);
                DragOutcome::Started(id)
            }
            DragState::Dragging { active, .. } => {
                debug!("[DND] Drag {} cancelled by new drag {}", active, id);
                DragOutcome::Restarted {
                    cancelled: active,
                    active: id,
                }
            }
        }
    }

    /// Record the hovered target. Never touches the board.
    pub fn on_drag_over(&mut self, target_id: Option<&str>) -> DragOutcome {
        match &mut self.state {
            DragState::Idle => DragOutcome::Ignored,
            DragState::Dragging { over, .. } => {
                *over = target_id.map(str::to_string);
                DragOutcome::Hovering(over.clone())
            }
        }
    }

    /// Resolve the drop and apply it to `board`
    pub fn on_drag_end(&mut self, board: &mut Board, target_id: Option<&str>) -> DragOutcome {
        let active = match std::mem::take(&mut self.state) {
            DragState::Idle => return DragOutcome::Ignored,
            DragState::Dragging { active, .. } => active,
        };

        match resolve_drop(board, &active, target_id) {
            Resolution::Apply(next, outcome) => {
                debug!("[DND] Drop applied: {:?}", outcome);
                *board = next;
                outcome
            }
            Resolution::Skip(outcome) => {
                match &outcome {
                    DragOutcome::Rejected(err) => {
                        warn!("[DND] Drop of {} rejected: {}", active, err)
                    }
                    other => debug!("[DND] Drop of {} skipped: {:?}", active, other),
                }
                outcome
            }
        }
    }

    pub fn on_drag_cancel(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DragOutcome::Ignored,
            DragState::Dragging { active, .. } => {
                debug!("[DND] Drag cancelled: {}", active);
                DragOutcome::Cancelled
            }
        }
    }

    // ========================
    // Visual feedback
    // ========================

    pub fn is_dragging(&self, id: &ItemId) -> bool {
        self.active_id() == Some(id)
    }

    /// Whether `id` (tier or item) is highlighted as the drop target.
    /// The dragged item is never its own target.
    pub fn is_drop_target(&self, id: &str) -> bool {
        match &self.state {
            DragState::Dragging { active, over: Some(over) } => over == id && active.as_str() != id,
            _ => false,
        }
    }

    /// The dragged item, for the overlay preview
    pub fn active_item<'b>(&self, board: &'b Board) -> Option<&'b Item> {
        self.active_id().and_then(|id| board.find_item(id))
    }

    pub fn hover_hint(&self, board: &Board, tier: TierId) -> Option<&'static str> {
        if self.hovered() == Some(tier.as_str()) && board.items(tier).is_empty() {
            Some(DROP_HINT)
        } else {
            None
        }
    }
}

fn resolve_drop(board: &Board, active: &ItemId, target_id: Option<&str>) -> Resolution {
    let Some(target_id) = target_id else {
        return Resolution::Skip(DragOutcome::Aborted(AbortReason::NoTarget));
    };
    let Some((source, from)) = board.locate(active) else {
        return Resolution::Skip(DragOutcome::Aborted(AbortReason::SourceMissing));
    };
    let Some(target) = DropTarget::resolve(board, target_id) else {
        return Resolution::Skip(DragOutcome::Aborted(AbortReason::UnknownTarget(
            target_id.to_string(),
        )));
    };
    if let Err(err) = board.check_capacity(target.tier(), active) {
        return Resolution::Skip(DragOutcome::Rejected(err));
    }

    if source == target.tier() {
        // Dropping on the tier itself keeps the current position
        let Some(to) = target.index() else {
            return Resolution::Skip(DragOutcome::Unchanged);
        };
        if to == from {
            return Resolution::Skip(DragOutcome::Unchanged);
        }
        return match board.move_within_tier(source, from, to) {
            Ok(next) => Resolution::Apply(
                next,
                DragOutcome::Moved {
                    item: active.clone(),
                    from: source,
                    to: source,
                    index: to,
                },
            ),
            Err(err) => Resolution::Skip(DragOutcome::Rejected(err)),
        };
    }

    match board.move_across_tiers(active, target.tier(), target.index()) {
        Ok(next) => {
            let index = next.locate(active).map(|(_, index)| index).unwrap_or_default();
            Resolution::Apply(
                next,
                DragOutcome::Moved {
                    item: active.clone(),
                    from: source,
                    to: target.tier(),
                    index,
                },
            )
        }
        Err(err) => Resolution::Skip(DragOutcome::Rejected(err)),
    }
}
