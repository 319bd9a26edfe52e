//! Error types for the game core.

use crate::types::CardId;

/// Errors that can occur while generating cards or validating a round.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Themed generation needs at least 24 non-free values per card.
    #[error("themed pool has {got} items, need at least {need}")]
    ThemePoolTooSmall { got: usize, need: usize },

    /// A win pattern must name at least one cell.
    #[error("win pattern must contain at least one cell index")]
    EmptyPattern,

    /// A pattern or mark referenced a cell outside the 5x5 grid.
    #[error("cell index {0} is outside the 5x5 grid")]
    IndexOutOfRange(u8),

    /// No card with this id exists in the current round.
    #[error("no card with id {0}")]
    UnknownCard(CardId),
}
