//! Identity types and callable values.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Stable integer identity for a player's card set within a round.
///
/// Allocated as the smallest unused non-negative integer when a new player
/// joins. Never reclaimed while the round is running, so a reconnecting
/// player resumes the same slot.
///
/// `#[serde(transparent)]` serializes this as the bare integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct OwnerIndex(pub u32);

impl fmt::Display for OwnerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner-{}", self.0)
    }
}

/// A unique identifier for a single bingo card.
///
/// Ids come from a monotonic per-session allocator ([`crate::CardIds`]),
/// so two generations in the same instant can never collide.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// GameMode
// ---------------------------------------------------------------------------

/// How the item pool and cards are produced for a round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "PascalCase")]
pub enum GameMode {
    /// Classic 75-ball bingo: each column draws from its own range of 15.
    #[default]
    Standard,

    /// Free-form pool of short strings; every card is a shuffled subset.
    Themed,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Themed => write!(f, "themed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A single callable value: a number in standard mode, a short string in
/// themed mode.
///
/// `#[serde(untagged)]` keeps the wire format plain: `42` or `"flamingo"`,
/// no wrapper object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Number(u8),
    Text(String),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u8> for Item {
    fn from(n: u8) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// =========================================================================
// Tests
// =========================================================================
