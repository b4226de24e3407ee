//! Tier Board State
//!
//! Ordered tiers, each holding an ordered item sequence. Every mutation is
//! pure: it returns a new board or an error and leaves the receiver untouched.
//!
//! Invariants:
//! - every registry tier is present, in registry order
//! - no item id appears twice across the board
//! - a capacity-limited tier never exceeds its limit

use std::collections::HashSet;

use serde::Serialize;

use super::entity::{DomainError, DomainResult};
use super::item::{Item, ItemId};
use super::tier::TierId;

/// One tier and its items, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSlot {
    pub tier: TierId,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    tiers: Vec<TierSlot>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// All tiers present and empty
    pub fn new() -> Self {
        Self {
            tiers: TierId::ALL
                .iter()
                .map(|tier| TierSlot {
                    tier: *tier,
                    items: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn tiers(&self) -> &[TierSlot] {
        &self.tiers
    }

    pub fn items(&self, tier: TierId) -> &[Item] {
        &self.tiers[tier.rank()].items
    }

    /// Total number of items across tiers
    pub fn len(&self) -> usize {
        self.tiers.iter().map(|slot| slot.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tier and index of an item. First match in tier order wins.
    pub fn locate(&self, id: &ItemId) -> Option<(TierId, usize)> {
        self.locate_str(id.as_str())
    }

    pub fn locate_str(&self, id: &str) -> Option<(TierId, usize)> {
        self.tiers.iter().find_map(|slot| {
            slot.items
                .iter()
                .position(|item| item.id.as_str() == id)
                .map(|index| (slot.tier, index))
        })
    }

    pub fn find_item(&self, id: &ItemId) -> Option<&Item> {
        self.locate(id)
            .map(|(tier, index)| &self.tiers[tier.rank()].items[index])
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.locate(id).is_some()
    }

    /// Whether a new item may be added to `tier`
    pub fn can_add(&self, tier: TierId) -> bool {
        tier.capacity().admits(self.items(tier).len())
    }

    /// Capacity rule for placing `incoming` into `target`.
    /// An item already in the target never counts against it.
    pub fn check_capacity(&self, target: TierId, incoming: &ItemId) -> DomainResult<()> {
        let items = self.items(target);
        if items.iter().any(|item| &item.id == incoming) {
            return Ok(());
        }
        if target.capacity().admits(items.len()) {
            Ok(())
        } else {
            Err(capacity_error(target))
        }
    }

    /// Append a new item with a fresh id to the end of `tier`
    pub fn add_item(&self, tier: TierId, title: &str, image_url: &str) -> DomainResult<Board> {
        if !self.can_add(tier) {
            return Err(capacity_error(tier));
        }
        let item = Item::new(title, image_url)?;
        self.insert_item(tier, item)
    }

    /// Append an existing item to the end of `tier`
    pub fn insert_item(&self, tier: TierId, item: Item) -> DomainResult<Board> {
        if self.contains(&item.id) {
            return Err(DomainError::InvalidInput(format!(
                "Item {} is already on the board.",
                item.id
            )));
        }
        if !self.can_add(tier) {
            return Err(capacity_error(tier));
        }
        let mut next = self.clone();
        next.tiers[tier.rank()].items.push(item);
        Ok(next)
    }

    pub fn remove_item(&self, id: &ItemId) -> DomainResult<Board> {
        let (tier, index) = self.locate(id).ok_or_else(|| item_not_found(id))?;
        let mut next = self.clone();
        next.tiers[tier.rank()].items.remove(index);
        Ok(next)
    }

    /// Array move: the item at `from` ends at `to`, items in between shift by one
    pub fn move_within_tier(&self, tier: TierId, from: usize, to: usize) -> DomainResult<Board> {
        let len = self.items(tier).len();
        for index in [from, to] {
            if index >= len {
                return Err(DomainError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        let items = &mut next.tiers[tier.rank()].items;
        let item = items.remove(from);
        items.insert(to, item);
        Ok(next)
    }

    /// Move an item into another tier, before `target_index` when it is a
    /// valid insertion point, otherwise at the end.
    /// A move into the item's current tier is a no-op.
    pub fn move_across_tiers(
        &self,
        id: &ItemId,
        target: TierId,
        target_index: Option<usize>,
    ) -> DomainResult<Board> {
        let (source, from) = self.locate(id).ok_or_else(|| item_not_found(id))?;
        if source == target {
            return Ok(self.clone());
        }
        self.check_capacity(target, id)?;

        let mut next = self.clone();
        let item = next.tiers[source.rank()].items.remove(from);
        let dest = &mut next.tiers[target.rank()].items;
        match target_index {
            Some(index) if index <= dest.len() => dest.insert(index, item),
            _ => dest.push(item),
        }
        Ok(next)
    }

    /// Replace a tier's sequence wholesale with stored items.
    ///
    /// Stored data is not trusted: items whose id is already on the board
    /// and items beyond the tier's capacity are dropped with a warning.
    pub fn with_tier_items(mut self, tier: TierId, items: Vec<Item>) -> Self {
        let taken: HashSet<ItemId> = self
            .tiers
            .iter()
            .filter(|slot| slot.tier != tier)
            .flat_map(|slot| slot.items.iter().map(|item| item.id.clone()))
            .collect();

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            if taken.contains(&item.id) || !seen.insert(item.id.clone()) {
                log::warn!("Dropping duplicate item {} while loading tier {}", item.id, tier);
                continue;
            }
            if !tier.capacity().admits(kept.len()) {
                log::warn!("Dropping item {} beyond capacity of tier {}", item.id, tier);
                continue;
            }
            kept.push(item);
        }

        self.tiers[tier.rank()].items = kept;
        self
    }

    /// Verify the board invariants
    pub fn check_invariants(&self) -> DomainResult<()> {
        let order: Vec<TierId> = self.tiers.iter().map(|slot| slot.tier).collect();
        if order != TierId::ALL {
            return Err(DomainError::Internal("tiers out of registry order".to_string()));
        }

        let mut seen = HashSet::new();
        for slot in &self.tiers {
            if let Some(max) = slot.tier.capacity().limit() {
                if slot.items.len() > max {
                    return Err(capacity_error(slot.tier));
                }
            }
            for item in &slot.items {
                if !seen.insert(&item.id) {
                    return Err(DomainError::Internal(format!("duplicate item {}", item.id)));
                }
            }
        }
        Ok(())
    }
}

/// Every limited tier holds a single title
fn capacity_error(tier: TierId) -> DomainError {
    DomainError::CapacityExceeded(format!(
        "{} can only hold one title!",
        tier.descriptor().label
    ))
}

fn item_not_found(id: &ItemId) -> DomainError {
    DomainError::NotFound(format!("item {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Item {
        Item::with_id(ItemId::from(id), &format!("Title {}", id), "http://img").unwrap()
    }

    fn board_with(layout: &[(TierId, &[&str])]) -> Board {
        layout.iter().fold(Board::new(), |board, (tier, ids)| {
            board.with_tier_items(*tier, ids.iter().map(|id| item(id)).collect())
        })
    }

    fn ids(board: &Board, tier: TierId) -> Vec<&str> {
        board.items(tier).iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_new_board_has_all_tiers_empty() {
        let board = Board::new();
        assert_eq!(board.tiers().len(), 7);
        assert!(board.is_empty());
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_add_item_lands_in_exactly_one_tier() {
        let board = Board::new().add_item(TierId::A, "Monster", "http://img").unwrap();
        let added = board.items(TierId::A)[0].id.clone();

        let owners: Vec<TierId> = board
            .tiers()
            .iter()
            .filter(|slot| slot.items.iter().any(|i| i.id == added))
            .map(|slot| slot.tier)
            .collect();
        assert_eq!(owners, vec![TierId::A]);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_add_item_appends() {
        let board = board_with(&[(TierId::B, &["b1", "b2"])]);
        let next = board.add_item(TierId::B, "New", "http://img").unwrap();
        assert_eq!(next.items(TierId::B).len(), 3);
        assert_eq!(next.items(TierId::B)[2].title, "New");
        // receiver untouched
        assert_eq!(board.items(TierId::B).len(), 2);
    }

    #[test]
    fn test_add_item_invalid_input() {
        let board = Board::new();
        assert!(matches!(
            board.add_item(TierId::S, "", "http://img"),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            board.add_item(TierId::S, "Title", " "),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_second_item_in_limited_tier_rejected() {
        let board = board_with(&[(TierId::National, &["g1"])]);
        let before = board.clone();

        let err = board.add_item(TierId::National, "Another", "http://img").unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded(_)));
        assert_eq!(board, before);
        assert!(!board.can_add(TierId::National));
    }

    #[test]
    fn test_remove_item() {
        let board = board_with(&[(TierId::S, &["x1", "x2"])]);
        let next = board.remove_item(&ItemId::from("x1")).unwrap();
        assert_eq!(ids(&next, TierId::S), vec!["x2"]);

        let err = next.remove_item(&ItemId::from("x1")).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_move_within_tier_is_array_move() {
        let board = board_with(&[(TierId::C, &["a", "b", "c", "d"])]);

        let forward = board.move_within_tier(TierId::C, 0, 2).unwrap();
        assert_eq!(ids(&forward, TierId::C), vec!["b", "c", "a", "d"]);

        let backward = board.move_within_tier(TierId::C, 3, 1).unwrap();
        assert_eq!(ids(&backward, TierId::C), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_move_within_tier_round_trip() {
        let board = board_with(&[(TierId::C, &["a", "b", "c", "d", "e"])]);
        for from in 0..5 {
            for to in 0..5 {
                let there = board.move_within_tier(TierId::C, from, to).unwrap();
                let back = there.move_within_tier(TierId::C, to, from).unwrap();
                assert_eq!(back, board, "from {} to {}", from, to);
            }
        }
    }

    #[test]
    fn test_move_within_tier_bounds() {
        let board = board_with(&[(TierId::C, &["a", "b"])]);
        assert_eq!(
            board.move_within_tier(TierId::C, 2, 0).unwrap_err(),
            DomainError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            board.move_within_tier(TierId::C, 0, 5).unwrap_err(),
            DomainError::IndexOutOfRange { index: 5, len: 2 }
        );
        assert!(board.move_within_tier(TierId::D, 0, 0).is_err());
    }

    #[test]
    fn test_move_across_tiers_inserts_or_appends() {
        let board = board_with(&[(TierId::S, &["x1"]), (TierId::A, &["a1", "a2"])]);
        let id = ItemId::from("x1");

        let before = board.move_across_tiers(&id, TierId::A, Some(1)).unwrap();
        assert_eq!(ids(&before, TierId::A), vec!["a1", "x1", "a2"]);
        assert!(before.items(TierId::S).is_empty());

        let appended = board.move_across_tiers(&id, TierId::A, None).unwrap();
        assert_eq!(ids(&appended, TierId::A), vec!["a1", "a2", "x1"]);

        // Invalid insertion point falls back to append
        let clamped = board.move_across_tiers(&id, TierId::A, Some(9)).unwrap();
        assert_eq!(ids(&clamped, TierId::A), vec!["a1", "a2", "x1"]);
    }

    #[test]
    fn test_move_across_tiers_round_trip() {
        let board = board_with(&[(TierId::S, &["s1", "x", "s2"]), (TierId::B, &["b1", "b2"])]);
        let id = ItemId::from("x");
        let (source, original) = board.locate(&id).unwrap();

        for index in 0..=2 {
            let moved = board.move_across_tiers(&id, TierId::B, Some(index)).unwrap();
            let restored = moved.move_across_tiers(&id, source, Some(original)).unwrap();
            assert_eq!(restored, board);
        }
    }

    #[test]
    fn test_move_across_tiers_errors() {
        let board = board_with(&[(TierId::National, &["g1"]), (TierId::S, &["x1"])]);

        let err = board
            .move_across_tiers(&ItemId::from("missing"), TierId::A, None)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = board
            .move_across_tiers(&ItemId::from("x1"), TierId::National, None)
            .unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded(_)));
    }

    #[test]
    fn test_move_sole_occupant_onto_own_tier_is_noop() {
        let board = board_with(&[(TierId::National, &["g1"])]);
        let next = board
            .move_across_tiers(&ItemId::from("g1"), TierId::National, Some(0))
            .unwrap();
        assert_eq!(next, board);
        assert!(board.check_capacity(TierId::National, &ItemId::from("g1")).is_ok());
    }

    #[test]
    fn test_limited_tier_never_overflows() {
        let mut board = board_with(&[(TierId::S, &["a", "b", "c"])]);
        let moves = [
            ("a", TierId::National),
            ("b", TierId::National),
            ("a", TierId::S),
            ("c", TierId::National),
        ];
        for (id, tier) in moves {
            if let Ok(next) = board.move_across_tiers(&ItemId::from(id), tier, None) {
                board = next;
            }
            assert!(board.items(TierId::National).len() <= 1);
            board.check_invariants().unwrap();
        }
        assert_eq!(ids(&board, TierId::National), vec!["c"]);
    }

    #[test]
    fn test_with_tier_items_drops_duplicates_and_overflow() {
        let board = Board::new()
            .with_tier_items(TierId::National, vec![item("g1"), item("g2")])
            .with_tier_items(TierId::S, vec![item("x1"), item("g1"), item("x1")]);

        assert_eq!(ids(&board, TierId::National), vec!["g1"]);
        assert_eq!(ids(&board, TierId::S), vec!["x1"]);
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_item_rejects_duplicate() {
        let board = board_with(&[(TierId::S, &["x1"])]);
        let err = board.insert_item(TierId::A, item("x1")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_locate_and_find() {
        let board = board_with(&[(TierId::D, &["d1", "d2"])]);
        assert_eq!(board.locate_str("d2"), Some((TierId::D, 1)));
        assert_eq!(board.find_item(&ItemId::from("d1")).unwrap().title, "Title d1");
        assert!(board.locate_str("D").is_none());
    }
}
