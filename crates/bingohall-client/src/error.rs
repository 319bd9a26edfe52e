//! Error types for the client layer.

use crate::ClientPhase;

/// Errors that can occur on the player side.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The requested operation is not valid in the current phase.
    #[error("operation not valid in phase {0}")]
    WrongPhase(ClientPhase),

    /// The session has no table yet (no `Welcome` received).
    #[error("not joined to a room")]
    NotJoined,

    /// The referenced card is not one of this player's cards.
    #[error("no local card with that id")]
    UnknownCard,

    /// A game-level rule was violated (bad cell index on a tap).
    #[error(transparent)]
    Game(#[from] bingohall_game::GameError),
}
