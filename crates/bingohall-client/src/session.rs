//! The client session: phase machine plus local table shadow.

use std::collections::BTreeSet;

use bingohall_game::{BingoCard, CardId, GameMode, Item, OwnerIndex, WinPattern};
use bingohall_protocol::{
    ChatMessage, ClientMessage, RoundSnapshot, ServerMessage,
};

use crate::{ClientError, ClientPhase};

// ---------------------------------------------------------------------------
// MarkMode
// ---------------------------------------------------------------------------

/// Whether calls mark matching cells automatically or wait for a tap.
///
/// Switching modes only changes how future calls are handled; past calls
/// are never retroactively applied or unapplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkMode {
    #[default]
    Auto,
    Manual,
}

// ---------------------------------------------------------------------------
// TableView
// ---------------------------------------------------------------------------

/// The local shadow of the round: what the player renders.
///
/// Everything here mirrors host truth except `cards[].marked` (which may
/// diverge in manual mode) and `has_bingo` (a local pre-check). The host
/// re-verifies claims against its own history regardless.
#[derive(Debug, Clone)]
pub struct TableView {
    pub owner: OwnerIndex,
    pub player_name: String,
    pub cards: Vec<BingoCard>,
    pub mode: GameMode,
    pub theme: String,
    pub prize: String,
    pub current_call: Option<Item>,
    /// Most-recent-first, same order as the host.
    pub called_items: Vec<Item>,
    pub win_patterns: Vec<WinPattern>,
    /// Card ids learned from `BingoAnnounced`. Used only to hide the
    /// claim affordance for cards that already won.
    pub winners: BTreeSet<CardId>,
    pub chat: Vec<ChatMessage>,
}

impl TableView {
    fn from_snapshot(snapshot: RoundSnapshot) -> Self {
        Self {
            owner: snapshot.owner,
            player_name: snapshot.player_name,
            cards: snapshot.cards,
            mode: snapshot.mode,
            theme: snapshot.theme,
            prize: snapshot.prize,
            current_call: snapshot.current_call,
            called_items: snapshot.called_items,
            win_patterns: snapshot.win_patterns,
            winners: BTreeSet::new(),
            chat: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// What a handled message means for the layer above (rendering, audio,
/// the driver loop).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The table is initialized; the session is live.
    Joined,
    /// A new call was applied to the shadow.
    Called(Item),
    /// The host certified a winner.
    WinnerAnnounced { owner: OwnerIndex, card_id: CardId },
    /// Our claim did not hold up.
    ClaimRejected { card_id: CardId, reason: String },
    /// A fresh round replaced the table.
    NewRound,
    /// Legacy reset: the driver must re-send a `JoinRequest`.
    RejoinRequired,
    /// A relayed chat line.
    Chat(ChatMessage),
}

// ---------------------------------------------------------------------------
// ClientSession
// ---------------------------------------------------------------------------

/// Player-side session state. Pure and synchronous; an async driver
/// feeds it decoded messages and sends whatever it returns.
#[derive(Debug)]
pub struct ClientSession {
    player_name: String,
    phase: ClientPhase,
    mark_mode: MarkMode,
    /// Kept outside the table so it survives a `GameReset` teardown.
    resume_token: Option<String>,
    table: Option<TableView>,
}

impl ClientSession {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            phase: ClientPhase::Idle,
            mark_mode: MarkMode::default(),
            resume_token: None,
            table: None,
        }
    }

    pub fn phase(&self) -> ClientPhase {
        self.phase
    }

    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    pub fn mark_mode(&self) -> MarkMode {
        self.mark_mode
    }

    /// Changes how future calls are marked. Not retroactive.
    pub fn set_mark_mode(&mut self, mode: MarkMode) {
        self.mark_mode = mode;
    }

    // -- Phase transitions ------------------------------------------------

    /// Starts (or retries) a connection attempt.
    pub fn begin_connect(&mut self) -> Result<(), ClientError> {
        self.transition(ClientPhase::Connecting)
    }

    /// The channel is open; returns the `JoinRequest` to send. The
    /// session now waits for the host's `Welcome`.
    pub fn channel_opened(&mut self) -> Result<ClientMessage, ClientError> {
        self.transition(ClientPhase::WaitingForHost)?;
        Ok(self.join_request())
    }

    /// The `JoinRequest` for this player, carrying the resume token when
    /// one was issued earlier.
    pub fn join_request(&self) -> ClientMessage {
        ClientMessage::JoinRequest {
            player_name: self.player_name.clone(),
            resume_token: self.resume_token.clone(),
        }
    }

    /// Transport failure, dial timeout, or channel close. Reachable from
    /// any phase; a later [`begin_connect`](Self::begin_connect) retries.
    pub fn fail(&mut self, reason: &str) {
        tracing::debug!(phase = %self.phase, reason, "client failed");
        self.phase = ClientPhase::Error;
    }

    fn transition(&mut self, to: ClientPhase) -> Result<(), ClientError> {
        if !self.phase.can_transition_to(to) {
            return Err(ClientError::WrongPhase(self.phase));
        }
        self.phase = to;
        Ok(())
    }

    // -- Message application ----------------------------------------------

    /// Applies one host message to the shadow.
    ///
    /// `Welcome` is accepted while waiting for the host and completes
    /// the connection; everything else is processed only in `Connected`.
    /// Out-of-phase messages are dropped with a log line, never an error:
    /// the session must survive any sequence of inputs.
    pub fn handle_message(
        &mut self,
        msg: ServerMessage,
    ) -> Option<ClientEvent> {
        match msg {
            ServerMessage::Welcome(snapshot) => {
                self.apply_welcome(snapshot)
            }
            _ if !self.phase.processes_game_messages() => {
                tracing::debug!(
                    phase = %self.phase,
                    "dropping game message outside Connected"
                );
                None
            }
            ServerMessage::NextCall { item } => self.apply_call(item),
            ServerMessage::BingoAnnounced { owner, card_id } => {
                if let Some(table) = &mut self.table {
                    table.winners.insert(card_id);
                }
                Some(ClientEvent::WinnerAnnounced { owner, card_id })
            }
            ServerMessage::ClaimRejected { card_id, reason } => {
                Some(ClientEvent::ClaimRejected { card_id, reason })
            }
            ServerMessage::GameReset => {
                // Legacy flow: drop the table and go ask again.
                self.table = None;
                self.phase = ClientPhase::WaitingForHost;
                Some(ClientEvent::RejoinRequired)
            }
            ServerMessage::NewGame(snapshot) => {
                self.resume_token = Some(snapshot.resume_token.clone());
                self.table = Some(TableView::from_snapshot(snapshot));
                Some(ClientEvent::NewRound)
            }
            ServerMessage::Chat { message } => {
                if let Some(table) = &mut self.table {
                    table.chat.push(message.clone());
                }
                Some(ClientEvent::Chat(message))
            }
        }
    }

    fn apply_welcome(
        &mut self,
        snapshot: RoundSnapshot,
    ) -> Option<ClientEvent> {
        if self.phase != ClientPhase::WaitingForHost
            && self.phase != ClientPhase::Connected
        {
            tracing::debug!(phase = %self.phase, "dropping unexpected Welcome");
            return None;
        }
        self.phase = ClientPhase::Connected;
        self.resume_token = Some(snapshot.resume_token.clone());
        self.table = Some(TableView::from_snapshot(snapshot));
        Some(ClientEvent::Joined)
    }

    fn apply_call(&mut self, item: Item) -> Option<ClientEvent> {
        let auto = self.mark_mode == MarkMode::Auto;
        let table = self.table.as_mut()?;

        table.called_items.insert(0, item.clone());
        table.current_call = Some(item.clone());
        for card in &mut table.cards {
            if auto {
                card.mark_value(&item);
            }
            // The win state is recomputed on every call either way; in
            // manual mode earlier taps may already complete a line.
            card.refresh_bingo(&table.win_patterns);
        }
        Some(ClientEvent::Called(item))
    }

    // -- Player actions ---------------------------------------------------

    /// Cards worth showing a claim button for: locally winning and not
    /// already announced. A UX guard only; the host re-verifies.
    pub fn claimable_cards(&self) -> Vec<CardId> {
        self.table
            .as_ref()
            .map(|t| {
                t.cards
                    .iter()
                    .filter(|c| c.has_bingo && !t.winners.contains(&c.id))
                    .map(|c| c.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Builds the claim message for one of our cards.
    pub fn claim(
        &self,
        card_id: CardId,
    ) -> Result<ClientMessage, ClientError> {
        let table = self.table.as_ref().ok_or(ClientError::NotJoined)?;
        if !table.cards.iter().any(|c| c.id == card_id) {
            return Err(ClientError::UnknownCard);
        }
        Ok(ClientMessage::ClaimBingo {
            card_id,
            owner: table.owner,
        })
    }

    /// Builds a chat message. The host overwrites id, timestamp, and
    /// sender on relay.
    pub fn chat(
        &self,
        text: impl Into<String>,
    ) -> Result<ClientMessage, ClientError> {
        if self.table.is_none() {
            return Err(ClientError::NotJoined);
        }
        Ok(ClientMessage::Chat {
            message: ChatMessage {
                id: 0,
                sender: self.player_name.clone(),
                text: text.into(),
                timestamp: 0,
            },
        })
    }

    /// A manual tap on a cell. Valid in either mark mode; recomputes the
    /// card's win state. Returns the cell's satisfied state.
    pub fn toggle_cell(
        &mut self,
        card_id: CardId,
        cell_index: usize,
    ) -> Result<bool, ClientError> {
        let table = self.table.as_mut().ok_or(ClientError::NotJoined)?;
        let card = table
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or(ClientError::UnknownCard)?;
        let satisfied = card.toggle_mark(cell_index)?;
        card.refresh_bingo(&table.win_patterns);
        Ok(satisfied)
    }
}

// =========================================================================
// Tests
// =========================================================================
