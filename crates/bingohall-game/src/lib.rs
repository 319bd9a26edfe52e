//! Game rules for Bingohall: cards, win patterns, and round state.
//!
//! This crate is the pure core of the system. It knows nothing about
//! networking or async; it defines:
//!
//! - **Types** ([`Item`], [`OwnerIndex`], [`CardId`], [`GameMode`]) that
//!   identify players, cards, and callable values.
//! - **Cards** ([`BingoCard`], [`BingoCell`]) and how they are generated
//!   ([`generate_cards`], [`CardIds`]).
//! - **Win patterns** ([`WinPattern`], [`PatternPreset`]) and the
//!   evaluator ([`evaluate`]) that decides whether a card has won.
//! - **Round state** ([`GameState`]) holding the single authoritative
//!   copy of a round: the item pool, the called history, every card, and
//!   the verified winners.
//!
//! The host session crate owns a `GameState` and mutates it through its
//! methods; clients hold a shadow of the same data and reuse the same
//! evaluator for local pre-checks.

mod card;
mod error;
mod generator;
mod pattern;
mod state;
mod types;

pub use card::{
    BingoCard, BingoCell, CardColor, CELLS_PER_CARD, FREE_SPACE_INDEX,
    GRID_SIZE,
};
pub use error::GameError;
pub use generator::{generate_cards, CardIds, CARDS_PER_PLAYER, MIN_THEMED_ITEMS};
pub use pattern::{evaluate, evaluate_flags, PatternPreset, WinPattern};
pub use state::{standard_pool, GameState};
pub use types::{CardId, GameMode, Item, OwnerIndex};
