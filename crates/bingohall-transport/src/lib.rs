//! Transport layer for Bingohall.
//!
//! The core treats connectivity as a capability: a host `listen()`s for
//! channels, a player `connect(roomCode)`s to obtain one. This crate
//! defines those capabilities as traits ([`Listener`], [`Connector`],
//! [`Channel`]) plus the [`RoomCode`] players dial, and ships a WebSocket
//! implementation behind the `websocket` feature (on by default).
//!
//! How a room code resolves to a reachable host (broker, DNS, a URL
//! pasted in chat) is the deployment's concern; the connector here maps
//! the code onto a URL path and everything above only sees an opened
//! channel.

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketChannel, WebSocketConnector, WebSocketListener};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default dial timeout; a player whose connect attempt exceeds this
/// moves to its error state.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Length of a room code in characters.
pub const ROOM_CODE_LEN: usize = 8;

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// The opaque 8-character identifier a host advertises and players dial.
///
/// Codes are uppercase alphanumeric; parsing normalizes case so players
/// can type them sloppily.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds a code from raw characters, bypassing user-input
    /// normalization. Used by the host-side allocator.
    pub fn from_chars(
        chars: impl IntoIterator<Item = char>,
    ) -> Result<Self, TransportError> {
        let s: String = chars.into_iter().collect();
        s.parse()
    }
}

impl FromStr for RoomCode {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.trim().to_uppercase();
        let valid = normalized.len() == ROOM_CODE_LEN
            && normalized
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if valid {
            Ok(Self(normalized))
        } else {
            Err(TransportError::InvalidRoomCode(s.to_string()))
        }
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChannelId
// ---------------------------------------------------------------------------

/// Opaque identifier for an open channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chan-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// A reliable, ordered, bidirectional byte channel between host and
/// player. Ordering is load-bearing: call broadcasts must be applied in
/// the order issued.
pub trait Channel: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one message to the peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message. `Ok(None)` means the peer closed the
    /// channel cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the channel.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ChannelId;
}

/// Host side: accepts inbound channels from joining players.
pub trait Listener: Send + 'static {
    type Channel: Channel;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next player to dial in.
    async fn accept(&mut self) -> Result<Self::Channel, Self::Error>;
}

/// Player side: turns a room code into an open channel.
pub trait Connector: Send + Sync + 'static {
    type Channel: Channel;
    type Error: std::error::Error + Send + Sync;

    /// Dials the room. Implementations must bound the attempt with a
    /// timeout; no operation blocks indefinitely.
    async fn connect(
        &self,
        code: &RoomCode,
    ) -> Result<Self::Channel, Self::Error>;
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_parse_normalizes_case() {
        let code: RoomCode = "ab12cd34".parse().unwrap();
        assert_eq!(code.as_str(), "AB12CD34");
    }

    #[test]
    fn test_room_code_parse_trims_whitespace() {
        let code: RoomCode = "  AB12CD34 ".parse().unwrap();
        assert_eq!(code.as_str(), "AB12CD34");
    }

    #[test]
    fn test_room_code_rejects_wrong_length() {
        assert!("ABC".parse::<RoomCode>().is_err());
        assert!("ABCDEFGHI".parse::<RoomCode>().is_err());
    }

    #[test]
    fn test_room_code_rejects_non_alphanumeric() {
        assert!("AB12CD3!".parse::<RoomCode>().is_err());
        assert!("AB12 D34".parse::<RoomCode>().is_err());
    }

    #[test]
    fn test_room_code_display_round_trips() {
        let code: RoomCode = "ZZ99ZZ99".parse().unwrap();
        assert_eq!(code.to_string().parse::<RoomCode>().unwrap(), code);
    }

    #[test]
    fn test_channel_id_display_and_inner() {
        let id = ChannelId::new(5);
        assert_eq!(id.into_inner(), 5);
        assert_eq!(id.to_string(), "chan-5");
    }
}
