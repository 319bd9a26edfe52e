//! Card generation.
//!
//! Standard mode partitions 1..=75 into five column ranges of 15 (B, I,
//! N, G, O) and draws each column independently with a uniform shuffle,
//! so a card can never repeat a value. Themed mode shuffles the full item
//! pool per card and takes the first 24; exact duplicate cards across
//! players are improbable but not excluded, which is accepted.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::card::{
    BingoCard, BingoCell, CardColor, CELLS_PER_CARD, FREE_SPACE_INDEX,
    GRID_SIZE,
};
use crate::error::GameError;
use crate::types::{CardId, GameMode, Item, OwnerIndex};

/// Every player always holds exactly four cards.
pub const CARDS_PER_PLAYER: usize = 4;

/// Themed generation needs 24 non-free values to fill a card.
pub const MIN_THEMED_ITEMS: usize = 24;

/// Values per column in standard mode (B: 1-15, I: 16-30, ...).
const COLUMN_SPAN: u8 = 15;

// ---------------------------------------------------------------------------
// Card id allocation
// ---------------------------------------------------------------------------

/// Monotonic card id allocator owned by a session.
///
/// Ids stay unique for the session's lifetime even when generation runs
/// twice in the same instant, which rules out the wall-clock collision
/// class entirely.
#[derive(Debug, Default)]
pub struct CardIds {
    next: u64,
}

impl CardIds {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    fn allocate(&mut self) -> CardId {
        let id = CardId(self.next);
        self.next += 1;
        id
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates the four cards for one player.
///
/// # Errors
/// Themed mode fails with [`GameError::ThemePoolTooSmall`] when the pool
/// holds fewer than [`MIN_THEMED_ITEMS`] values. Standard mode cannot
/// fail; it ignores `pool` and draws from the fixed column ranges.
pub fn generate_cards(
    pool: &[Item],
    mode: GameMode,
    player_name: &str,
    owner: OwnerIndex,
    ids: &mut CardIds,
    rng: &mut impl Rng,
) -> Result<Vec<BingoCard>, GameError> {
    if mode == GameMode::Themed && pool.len() < MIN_THEMED_ITEMS {
        return Err(GameError::ThemePoolTooSmall {
            got: pool.len(),
            need: MIN_THEMED_ITEMS,
        });
    }

    let mut cards = Vec::with_capacity(CARDS_PER_PLAYER);
    for card_index in 0..CARDS_PER_PLAYER as u8 {
        let cells = match mode {
            GameMode::Standard => standard_cells(rng),
            GameMode::Themed => themed_cells(pool, rng),
        };
        cards.push(BingoCard {
            id: ids.allocate(),
            owner,
            card_index,
            player_name: player_name.to_string(),
            cells,
            has_bingo: false,
            color: CardColor::for_card_index(card_index),
        });
    }
    Ok(cards)
}

fn free_cell(index: usize) -> BingoCell {
    BingoCell {
        index: index as u8,
        value: Item::from("FREE"),
        marked: false,
        is_free: true,
    }
}

/// Draws 5 values per column from that column's range of 15, then lays
/// them out row-major. Column ranges are disjoint, so no value repeats
/// anywhere on the card.
fn standard_cells(rng: &mut impl Rng) -> Vec<BingoCell> {
    let mut columns: Vec<Vec<u8>> = Vec::with_capacity(GRID_SIZE);
    for col in 0..GRID_SIZE as u8 {
        let lo = col * COLUMN_SPAN + 1;
        let mut range: Vec<u8> = (lo..lo + COLUMN_SPAN).collect();
        range.shuffle(rng);
        range.truncate(GRID_SIZE);
        columns.push(range);
    }

    (0..CELLS_PER_CARD)
        .map(|i| {
            if i == FREE_SPACE_INDEX {
                free_cell(i)
            } else {
                let (row, col) = (i / GRID_SIZE, i % GRID_SIZE);
                BingoCell {
                    index: i as u8,
                    value: Item::Number(columns[col][row]),
                    marked: false,
                    is_free: false,
                }
            }
        })
        .collect()
}

/// Shuffles the whole pool and fills 24 cells row-major, skipping the
/// free space. Each card reshuffles independently.
fn themed_cells(pool: &[Item], rng: &mut impl Rng) -> Vec<BingoCell> {
    let mut drawn: Vec<Item> = pool.to_vec();
    drawn.shuffle(rng);
    let mut drawn = drawn.into_iter();

    (0..CELLS_PER_CARD)
        .map(|i| {
            if i == FREE_SPACE_INDEX {
                free_cell(i)
            } else {
                BingoCell {
                    index: i as u8,
                    // The pool length was checked on entry.
                    value: drawn.next().expect("pool holds at least 24"),
                    marked: false,
                    is_free: false,
                }
            }
        })
        .collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xB1A60)
    }

    fn themed_pool(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::from(format!("item-{i}"))).collect()
    }

    #[test]
    fn test_generate_cards_always_four_cards() {
        let cards = generate_cards(
            &[],
            GameMode::Standard,
            "ada",
            OwnerIndex(0),
            &mut CardIds::new(),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(cards.len(), CARDS_PER_PLAYER);
    }

    #[test]
    fn test_generate_cards_layout_invariants() {
        let cards = generate_cards(
            &[],
            GameMode::Standard,
            "ada",
            OwnerIndex(0),
            &mut CardIds::new(),
            &mut rng(),
        )
        .unwrap();

        for card in &cards {
            assert_eq!(card.cells.len(), CELLS_PER_CARD);
            let free: Vec<_> =
                card.cells.iter().filter(|c| c.is_free).collect();
            assert_eq!(free.len(), 1, "exactly one free space");
            assert_eq!(free[0].index as usize, FREE_SPACE_INDEX);
            for (i, cell) in card.cells.iter().enumerate() {
                assert_eq!(cell.index as usize, i, "row-major indices");
                assert!(!cell.marked);
            }
        }
    }

    #[test]
    fn test_generate_cards_standard_column_ranges() {
        let cards = generate_cards(
            &[],
            GameMode::Standard,
            "ada",
            OwnerIndex(0),
            &mut CardIds::new(),
            &mut rng(),
        )
        .unwrap();

        for card in &cards {
            let mut seen = HashSet::new();
            for cell in card.cells.iter().filter(|c| !c.is_free) {
                let col = cell.index as usize % GRID_SIZE;
                let Item::Number(n) = cell.value else {
                    panic!("standard cells hold numbers");
                };
                let lo = col as u8 * COLUMN_SPAN + 1;
                assert!(
                    (lo..lo + COLUMN_SPAN).contains(&n),
                    "value {n} outside column {col} range"
                );
                assert!(seen.insert(n), "duplicate value {n} on card");
            }
        }
    }

    #[test]
    fn test_generate_cards_themed_small_pool_fails() {
        let result = generate_cards(
            &themed_pool(20),
            GameMode::Themed,
            "ada",
            OwnerIndex(0),
            &mut CardIds::new(),
            &mut rng(),
        );
        assert!(matches!(
            result,
            Err(GameError::ThemePoolTooSmall { got: 20, need: 24 })
        ));
    }

    #[test]
    fn test_generate_cards_themed_pool_of_thirty_succeeds() {
        let cards = generate_cards(
            &themed_pool(30),
            GameMode::Themed,
            "ada",
            OwnerIndex(0),
            &mut CardIds::new(),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(cards.len(), 4);
        for card in &cards {
            let values: HashSet<_> = card
                .cells
                .iter()
                .filter(|c| !c.is_free)
                .map(|c| c.value.clone())
                .collect();
            assert_eq!(values.len(), 24, "24 distinct non-free values");
        }
    }

    #[test]
    fn test_generate_cards_ids_unique_across_players() {
        let mut ids = CardIds::new();
        let mut r = rng();
        let a = generate_cards(
            &[],
            GameMode::Standard,
            "ada",
            OwnerIndex(0),
            &mut ids,
            &mut r,
        )
        .unwrap();
        let b = generate_cards(
            &[],
            GameMode::Standard,
            "bea",
            OwnerIndex(1),
            &mut ids,
            &mut r,
        )
        .unwrap();

        let all: HashSet<_> =
            a.iter().chain(b.iter()).map(|c| c.id).collect();
        assert_eq!(all.len(), 8, "no id collisions");
    }

    #[test]
    fn test_generate_cards_card_indices_and_colors() {
        let cards = generate_cards(
            &[],
            GameMode::Standard,
            "ada",
            OwnerIndex(2),
            &mut CardIds::new(),
            &mut rng(),
        )
        .unwrap();
        for (i, card) in cards.iter().enumerate() {
            assert_eq!(card.card_index as usize, i);
            assert_eq!(card.owner, OwnerIndex(2));
            assert_eq!(card.color, CardColor::for_card_index(i as u8));
        }
    }
}
