//! Connection lifecycle state machine.

use std::fmt;

/// The phases of a player's connection attempt.
///
/// ```text
///   Idle -> Connecting -> WaitingForHost -> Connected
///                \              \              |
///                 +----------- Error <---------+
///                                |
///                                +--> Connecting (retry)
/// ```
///
/// `Error` is reachable from every phase on transport failure, timeout,
/// or channel close, and permits a fresh `Connecting` attempt. Game
/// messages are processed only in `Connected`; the `Welcome` that
/// arrives in `WaitingForHost` performs that last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    Idle,
    Connecting,
    WaitingForHost,
    Connected,
    Error,
}

impl ClientPhase {
    /// Whether moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        // Any phase may fail into Error.
        if target == Self::Error {
            return true;
        }
        matches!(
            (self, target),
            (Self::Idle, Self::Connecting)
                | (Self::Error, Self::Connecting)
                | (Self::Connecting, Self::WaitingForHost)
                | (Self::WaitingForHost, Self::Connected)
                // A round reset drops the table and re-joins in place.
                | (Self::Connected, Self::WaitingForHost)
        )
    }

    /// Only a connected client applies game messages.
    pub fn processes_game_messages(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ClientPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting",
            Self::WaitingForHost => "WaitingForHost",
            Self::Connected => "Connected",
            Self::Error => "Error",
        };
        write!(f, "{name}")
    }
}
