//! Error types for the host layer.

use bingohall_game::GameError;

/// Errors that can occur while hosting a session.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A round failed to build or a game-level rule was violated. Covers
    /// generation failures such as a themed pool below 24 items.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The theme content hook could not produce an item list.
    #[error("theme content unavailable: {0}")]
    ThemeUnavailable(String),

    /// The session actor is gone; its command channel is closed.
    #[error("session is no longer running")]
    Unavailable,
}
