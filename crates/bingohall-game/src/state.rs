//! Canonical round state.
//!
//! One `GameState` exists per round and lives inside the host session.
//! It is mutated only through these methods and replaced wholesale when a
//! new round starts; clients hold a shadow copy of the same data.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::card::BingoCard;
use crate::error::GameError;
use crate::generator::MIN_THEMED_ITEMS;
use crate::pattern::WinPattern;
use crate::types::{CardId, GameMode, Item, OwnerIndex};

/// The full 75-number pool used by standard rounds.
pub fn standard_pool() -> Vec<Item> {
    (1..=75).map(Item::Number).collect()
}

/// The authoritative state of one round.
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    pub theme: String,
    pub prize: String,
    /// Ordered pool of callable values, duplicate-free.
    pub all_items: Vec<Item>,
    /// Call history, most-recent-first, duplicate-free.
    pub called_items: Vec<Item>,
    pub current_call: Option<Item>,
    /// Every card across all players.
    pub cards: Vec<BingoCard>,
    /// Card ids the host has independently verified. Grow-only; cleared
    /// only by replacing the whole state at round start.
    pub winner_ids: BTreeSet<CardId>,
    pub win_patterns: Vec<WinPattern>,
}

impl GameState {
    /// Creates the state for a fresh round with no cards and an empty
    /// call history.
    ///
    /// Duplicate pool entries are dropped, keeping first occurrence.
    ///
    /// # Errors
    /// A themed round whose pool cannot fill a card is rejected up front
    /// with [`GameError::ThemePoolTooSmall`], before any player joins.
    pub fn new(
        mode: GameMode,
        theme: impl Into<String>,
        prize: impl Into<String>,
        items: Vec<Item>,
        win_patterns: Vec<WinPattern>,
    ) -> Result<Self, GameError> {
        let mut seen = BTreeSet::new();
        let all_items: Vec<Item> = items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect();

        if mode == GameMode::Themed && all_items.len() < MIN_THEMED_ITEMS {
            return Err(GameError::ThemePoolTooSmall {
                got: all_items.len(),
                need: MIN_THEMED_ITEMS,
            });
        }

        Ok(Self {
            mode,
            theme: theme.into(),
            prize: prize.into(),
            all_items,
            called_items: Vec::new(),
            current_call: None,
            cards: Vec::new(),
            winner_ids: BTreeSet::new(),
            win_patterns,
        })
    }

    /// Items not yet called, in pool order.
    pub fn remaining_items(&self) -> Vec<&Item> {
        self.all_items
            .iter()
            .filter(|item| !self.called_items.contains(item))
            .collect()
    }

    /// True once every pool item has been called.
    pub fn exhausted(&self) -> bool {
        self.called_items.len() >= self.all_items.len()
    }

    /// Draws the next call uniformly from the uncalled remainder.
    ///
    /// Returns `None` when the pool is exhausted; that is the terminal
    /// condition of a round, not an error. On success the item is
    /// prepended to the history, set as the current call, and marked on
    /// every card (host-local display), recomputing each card's
    /// `has_bingo`.
    pub fn call_next(&mut self, rng: &mut impl Rng) -> Option<Item> {
        let item = self.remaining_items().choose(rng).cloned().cloned()?;

        self.called_items.insert(0, item.clone());
        self.current_call = Some(item.clone());
        for card in &mut self.cards {
            card.mark_value(&item);
            card.refresh_bingo(&self.win_patterns);
        }
        Some(item)
    }

    pub fn card(&self, id: CardId) -> Option<&BingoCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Clones the cards belonging to one player, ordered by card index.
    pub fn cards_for(&self, owner: OwnerIndex) -> Vec<BingoCard> {
        let mut cards: Vec<BingoCard> = self
            .cards
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect();
        cards.sort_by_key(|c| c.card_index);
        cards
    }

    /// Re-derives whether a card has won strictly from the called-items
    /// history. Client-reported marks are never consulted.
    ///
    /// # Errors
    /// [`GameError::UnknownCard`] when no card has this id.
    pub fn verify_card(&self, id: CardId) -> Result<bool, GameError> {
        let card = self.card(id).ok_or(GameError::UnknownCard(id))?;
        let flags = card.flags_from_history(&self.called_items);
        Ok(crate::pattern::evaluate_flags(&flags, &self.win_patterns))
    }

    /// Records a verified winner. Returns `true` only on first insertion;
    /// later calls for the same card are no-ops, which is what makes
    /// duplicate claims idempotent.
    pub fn record_winner(&mut self, id: CardId) -> bool {
        self.winner_ids.insert(id)
    }

    pub fn is_winner(&self, id: CardId) -> bool {
        self.winner_ids.contains(&id)
    }
}

// =========================================================================
// Tests
// =========================================================================
