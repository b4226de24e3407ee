//! Drag and Drop
//!
//! Input-agnostic drag lifecycle for the tier board. Pointer and keyboard
//! sources both feed the same start / over / end / cancel events.

mod controller;

pub use controller::DragController;

use serde::Serialize;

use crate::domain::{Board, DomainError, ItemId, TierId};

/// Drop target types
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DropTarget {
    /// Drop on a tier container (append at the end)
    Tier(TierId),
    /// Drop on an item (take its place, it shifts back)
    Item { id: ItemId, tier: TierId, index: usize },
}

impl DropTarget {
    /// Resolve a raw target id against the board.
    /// Tier ids take precedence; otherwise the first item with exactly this id.
    pub fn resolve(board: &Board, target_id: &str) -> Option<Self> {
        if let Some(tier) = TierId::parse(target_id) {
            return Some(DropTarget::Tier(tier));
        }
        board.locate_str(target_id).map(|(tier, index)| DropTarget::Item {
            id: ItemId::from(target_id),
            tier,
            index,
        })
    }

    pub fn tier(&self) -> TierId {
        match self {
            DropTarget::Tier(tier) => *tier,
            DropTarget::Item { tier, .. } => *tier,
        }
    }

    /// Index of the target item, if the drop was on an item
    pub fn index(&self) -> Option<usize> {
        match self {
            DropTarget::Tier(_) => None,
            DropTarget::Item { index, .. } => Some(*index),
        }
    }
}

/// Transient drag session. At most one drag exists at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active: ItemId,
        /// Raw id of the hovered tier or item
        over: Option<String>,
    },
}

/// Observable phase, for rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DragPhase {
    Idle,
    Dragging,
    Hovering,
}

/// Why a drop resolved to nothing
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AbortReason {
    /// Released outside any tier or item
    NoTarget,
    /// The dragged item vanished from the board
    SourceMissing,
    /// Target id matches neither a tier nor an item
    UnknownTarget(String),
}

/// Result of feeding one event to the controller
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DragOutcome {
    /// Event not valid in the current state, nothing changed
    Ignored,
    Started(ItemId),
    /// A start arrived mid-drag: the old drag was cancelled first
    Restarted { cancelled: ItemId, active: ItemId },
    Hovering(Option<String>),
    Moved {
        item: ItemId,
        from: TierId,
        to: TierId,
        index: usize,
    },
    /// Drop resolved but leaves the board as it was
    Unchanged,
    Aborted(AbortReason),
    /// A board rule refused the move; board unchanged
    Rejected(DomainError),
    Cancelled,
}

impl DragOutcome {
    pub fn is_move(&self) -> bool {
        matches!(self, DragOutcome::Moved { .. })
    }
}
