//! Bingo cards and cells.

use serde::{Deserialize, Serialize};

use crate::pattern::WinPattern;
use crate::types::{CardId, Item, OwnerIndex};

/// Cards are 5x5 grids, stored row-major.
pub const GRID_SIZE: usize = 5;

/// Total cells per card.
pub const CELLS_PER_CARD: usize = 25;

/// Grid index of the free space (row 2, col 2, the center).
pub const FREE_SPACE_INDEX: usize = 12;

// ---------------------------------------------------------------------------
// BingoCell
// ---------------------------------------------------------------------------

/// One cell on a card.
///
/// Exactly one cell per card has `is_free == true`, always at grid index
/// 12. The free cell counts as satisfied for every pattern regardless of
/// `marked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoCell {
    /// Row-major grid position, 0..=24. Fixed at creation.
    pub index: u8,
    pub value: Item,
    pub marked: bool,
    pub is_free: bool,
}

impl BingoCell {
    /// A cell counts toward a pattern when marked or free.
    pub fn is_satisfied(&self) -> bool {
        self.marked || self.is_free
    }
}

// ---------------------------------------------------------------------------
// CardColor
// ---------------------------------------------------------------------------

/// Presentational tag distinguishing a player's four cards. Carries no
/// game-state semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CardColor {
    Coral,
    Teal,
    Gold,
    Violet,
}

impl CardColor {
    /// Cycles the palette by card index so each of a player's four cards
    /// gets a distinct color.
    pub fn for_card_index(card_index: u8) -> Self {
        match card_index % 4 {
            0 => Self::Coral,
            1 => Self::Teal,
            2 => Self::Gold,
            _ => Self::Violet,
        }
    }
}

// ---------------------------------------------------------------------------
// BingoCard
// ---------------------------------------------------------------------------

/// One 5x5 bingo card belonging to a player.
///
/// Cell count and layout never change after creation; only the `marked`
/// flags and the derived `has_bingo` mutate. The whole card is replaced
/// at round reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoCard {
    pub id: CardId,
    pub owner: OwnerIndex,
    /// Which of the player's four cards this is, 0..=3.
    pub card_index: u8,
    pub player_name: String,
    /// Exactly 25 cells, row-major.
    pub cells: Vec<BingoCell>,
    /// Derived from marks and patterns. Recomputed on every relevant
    /// change, never cached across them. Never authoritative on clients.
    pub has_bingo: bool,
    pub color: CardColor,
}

impl BingoCard {
    /// Marks every cell whose value equals `item`. Returns whether any
    /// cell changed.
    pub fn mark_value(&mut self, item: &Item) -> bool {
        let mut changed = false;
        for cell in &mut self.cells {
            if !cell.is_free && !cell.marked && cell.value == *item {
                cell.marked = true;
                changed = true;
            }
        }
        changed
    }

    /// Flips a cell's mark in response to a manual tap.
    ///
    /// The free space is already satisfied and stays that way; tapping it
    /// is a no-op. Returns the cell's satisfied state after the toggle.
    pub fn toggle_mark(
        &mut self,
        index: usize,
    ) -> Result<bool, crate::GameError> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(crate::GameError::IndexOutOfRange(index as u8))?;
        if cell.is_free {
            return Ok(true);
        }
        cell.marked = !cell.marked;
        Ok(cell.marked)
    }

    /// Satisfied flags as the card currently stands (own marks + free).
    pub fn satisfied_flags(&self) -> [bool; CELLS_PER_CARD] {
        let mut flags = [false; CELLS_PER_CARD];
        for cell in &self.cells {
            if let Some(slot) = flags.get_mut(cell.index as usize) {
                *slot = cell.is_satisfied();
            }
        }
        flags
    }

    /// Satisfied flags rebuilt strictly from a called-items history.
    ///
    /// This is the verification view: the card's own `marked` flags are
    /// ignored entirely, so client-side marks can never influence it.
    pub fn flags_from_history(
        &self,
        called: &[Item],
    ) -> [bool; CELLS_PER_CARD] {
        let mut flags = [false; CELLS_PER_CARD];
        for cell in &self.cells {
            if let Some(slot) = flags.get_mut(cell.index as usize) {
                *slot = cell.is_free || called.contains(&cell.value);
            }
        }
        flags
    }

    /// Recomputes `has_bingo` against the given patterns and returns the
    /// new value.
    pub fn refresh_bingo(&mut self, patterns: &[WinPattern]) -> bool {
        self.has_bingo =
            crate::pattern::evaluate_flags(&self.satisfied_flags(), patterns);
        self.has_bingo
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternPreset;

    /// Builds a card with numbers 0..25 laid out row-major and the free
    /// space at the center.
    fn card() -> BingoCard {
        let cells = (0..CELLS_PER_CARD)
            .map(|i| BingoCell {
                index: i as u8,
                value: if i == FREE_SPACE_INDEX {
                    Item::from("FREE")
                } else {
                    Item::Number(i as u8)
                },
                marked: false,
                is_free: i == FREE_SPACE_INDEX,
            })
            .collect();
        BingoCard {
            id: CardId(1),
            owner: OwnerIndex(0),
            card_index: 0,
            player_name: "ada".into(),
            cells,
            has_bingo: false,
            color: CardColor::Coral,
        }
    }

    #[test]
    fn test_mark_value_marks_matching_cell() {
        let mut c = card();
        assert!(c.mark_value(&Item::Number(3)));
        assert!(c.cells[3].marked);
    }

    #[test]
    fn test_mark_value_missing_item_changes_nothing() {
        let mut c = card();
        assert!(!c.mark_value(&Item::Number(200)));
        assert!(c.cells.iter().all(|cell| !cell.marked));
    }

    #[test]
    fn test_toggle_mark_free_space_is_noop() {
        let mut c = card();
        let satisfied = c.toggle_mark(FREE_SPACE_INDEX).unwrap();
        assert!(satisfied);
        assert!(!c.cells[FREE_SPACE_INDEX].marked);
    }

    #[test]
    fn test_toggle_mark_out_of_range_returns_error() {
        let mut c = card();
        assert!(c.toggle_mark(25).is_err());
    }

    #[test]
    fn test_toggle_mark_flips_both_ways() {
        let mut c = card();
        assert!(c.toggle_mark(0).unwrap());
        assert!(!c.toggle_mark(0).unwrap());
    }

    #[test]
    fn test_flags_from_history_ignores_local_marks() {
        let mut c = card();
        // Client marked everything, but nothing was ever called.
        for cell in &mut c.cells {
            cell.marked = true;
        }
        let flags = c.flags_from_history(&[]);
        for (i, flag) in flags.iter().enumerate() {
            assert_eq!(*flag, i == FREE_SPACE_INDEX, "index {i}");
        }
    }

    #[test]
    fn test_flags_from_history_reflects_called_items() {
        let c = card();
        let called = vec![Item::Number(0), Item::Number(24)];
        let flags = c.flags_from_history(&called);
        assert!(flags[0]);
        assert!(flags[24]);
        assert!(flags[FREE_SPACE_INDEX]);
        assert!(!flags[1]);
    }

    #[test]
    fn test_refresh_bingo_row_zero() {
        let mut c = card();
        let patterns = PatternPreset::AnyLine.patterns().unwrap();
        for i in 0..GRID_SIZE {
            assert!(!c.refresh_bingo(&patterns), "not yet at cell {i}");
            c.cells[i].marked = true;
        }
        assert!(c.refresh_bingo(&patterns));
    }

    #[test]
    fn test_card_color_cycles_by_index() {
        assert_eq!(CardColor::for_card_index(0), CardColor::Coral);
        assert_eq!(CardColor::for_card_index(3), CardColor::Violet);
        assert_eq!(CardColor::for_card_index(4), CardColor::Coral);
    }
}
