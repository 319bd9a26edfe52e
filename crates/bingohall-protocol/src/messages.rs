//! The closed message vocabulary exchanged between host and players.
//!
//! Every message is internally tagged (`#[serde(tag = "type")]`), so the
//! wire shows `{ "type": "NextCall", "item": 42 }`. The set is closed:
//! anything that fails to decode into one of these shapes is a protocol
//! violation, logged and dropped by the receiving side.

use serde::{Deserialize, Serialize};

use bingohall_game::{
    BingoCard, CardId, GameMode, Item, OwnerIndex, WinPattern,
};

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive a host-side message. The session's dispatch loop
/// resolves this against the currently connected players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected player.
    All,
    /// One specific player.
    Player(OwnerIndex),
    /// Everyone except one player. Used for chat relay, which must not
    /// echo back to the sender.
    AllExcept(OwnerIndex),
}

// ---------------------------------------------------------------------------
// Payload pieces
// ---------------------------------------------------------------------------

/// The full round context delivered on join and on round change.
///
/// `Welcome` and `NewGame` share this shape: owner identity, that
/// player's four cards, and everything needed to rebuild the local
/// shadow (history, current call, patterns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub owner: OwnerIndex,
    pub player_name: String,
    /// Secret the client presents on a later `JoinRequest` to reclaim
    /// this owner index after a disconnect.
    pub resume_token: String,
    pub cards: Vec<BingoCard>,
    pub mode: GameMode,
    pub theme: String,
    pub prize: String,
    pub current_call: Option<Item>,
    /// Most-recent-first, exactly the host's history.
    pub called_items: Vec<Item>,
    pub win_patterns: Vec<WinPattern>,
}

/// One chat line. The host assigns `id` and `timestamp` (ms since the
/// session started) when relaying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: String,
    pub text: String,
    pub timestamp: u64,
}

// ---------------------------------------------------------------------------
// Client -> host
// ---------------------------------------------------------------------------

/// Messages a player sends to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Sent once on connect, and again after a legacy `GameReset`.
    JoinRequest {
        player_name: String,
        /// Present on rejoin; lets the host match the previous owner
        /// index without relying on the display name.
        #[serde(default)]
        resume_token: Option<String>,
    },

    /// Assertion that a card has won. May arrive repeatedly for the same
    /// card; the host verifies and records idempotently.
    ClaimBingo { card_id: CardId, owner: OwnerIndex },

    /// A chat line for the rest of the room.
    Chat { message: ChatMessage },
}

// ---------------------------------------------------------------------------
// Host -> client
// ---------------------------------------------------------------------------

/// Messages the host sends to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Reply to a successful join or rejoin.
    Welcome(RoundSnapshot),

    /// A new call. Clients must apply these in the exact order received.
    NextCall { item: Item },

    /// A card the host verified. Emitted at most once per card.
    BingoAnnounced { owner: OwnerIndex, card_id: CardId },

    /// The claimant's card did not hold up against the host's history.
    /// Sent to the claimant only, never broadcast.
    ClaimRejected { card_id: CardId, reason: String },

    /// Legacy round-change signal asking clients to re-send
    /// `JoinRequest`. Decoded for compatibility; the canonical host
    /// pushes `NewGame` instead.
    GameReset,

    /// Fresh round context pushed directly to each known connection.
    NewGame(RoundSnapshot),

    /// A chat line relayed from another player.
    Chat { message: ChatMessage },
}

// =========================================================================
// Tests
// =========================================================================
