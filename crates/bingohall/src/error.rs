//! Unified error type for the meta crate.

use bingohall_client::ClientError;
use bingohall_game::GameError;
use bingohall_host::HostError;
use bingohall_protocol::ProtocolError;
use bingohall_transport::TransportError;

/// Top-level error wrapping every layer's error type, so binaries using
/// the meta crate handle one error with `?` throughout.
#[derive(Debug, thiserror::Error)]
pub enum HallError {
    /// Channel, dial, or listener failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode/decode or message-shape failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Game-rule failure (generation, patterns).
    #[error(transparent)]
    Game(#[from] GameError),

    /// Host session failure.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Player session failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}
