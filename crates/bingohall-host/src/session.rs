//! The room session actor: the single authority over round state.
//!
//! The session runs in its own Tokio task and owns the round's
//! `GameState` outright. Connection handlers and the operator talk to it
//! through a [`RoomSession`] handle; each operation becomes a command on
//! the actor's queue, so all mutation is applied atomically in arrival
//! order. Two claims racing for the same card serialize here: the first
//! verified claim records the winner, the second observes it recorded
//! and becomes a no-op.

use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot};

use bingohall_game::{
    CardId, CardIds, GameState, Item, OwnerIndex, generate_cards,
};
use bingohall_protocol::{
    ChatMessage, ClientMessage, Recipient, RoundSnapshot, ServerMessage,
};
use bingohall_transport::{ROOM_CODE_LEN, RoomCode};

use crate::{HostConfig, HostError, RoundConfig, Roster};

/// Channel sender delivering outbound messages to one player's
/// connection handler. Broadcasts are fire-and-forget: a send failure
/// means the handler is gone and the player is marked disconnected.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

enum SessionCommand {
    Join {
        player_name: String,
        resume_token: Option<String>,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<OwnerIndex, HostError>>,
    },
    /// The player's channel closed. Keeps their roster entry and cards.
    Leave { owner: OwnerIndex },
    CallNext {
        reply: oneshot::Sender<Option<Item>>,
    },
    Claim {
        owner: OwnerIndex,
        card_id: CardId,
    },
    Chat {
        owner: OwnerIndex,
        message: ChatMessage,
    },
    NewRound {
        round: RoundConfig,
        reply: oneshot::Sender<Result<(), HostError>>,
    },
    Info {
        reply: oneshot::Sender<SessionInfo>,
    },
    Shutdown,
}

/// Operator-facing snapshot of session progress.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub room_code: RoomCode,
    pub players: usize,
    pub connected: usize,
    pub called: usize,
    pub remaining: usize,
    pub current_call: Option<Item>,
    pub winners: Vec<CardId>,
    pub exhausted: bool,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running session actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomSession {
    code: RoomCode,
    sender: mpsc::Sender<SessionCommand>,
}

impl RoomSession {
    /// Validates the round, allocates a room code, and starts the actor.
    ///
    /// # Errors
    /// [`HostError::Game`] when the round cannot be built (themed pool
    /// below the minimum, empty custom pattern). Nothing is spawned in
    /// that case.
    pub fn spawn(
        round: RoundConfig,
        config: HostConfig,
    ) -> Result<Self, HostError> {
        let game = round.build_state()?;
        let code = generate_room_code(&mut rand::rng());
        let (tx, rx) = mpsc::channel(config.command_buffer);

        let actor = SessionActor {
            code: code.clone(),
            game,
            roster: Roster::new(),
            senders: HashMap::new(),
            card_ids: CardIds::new(),
            chat_seq: 0,
            started: Instant::now(),
            rng: StdRng::from_os_rng(),
            receiver: rx,
        };
        tokio::spawn(actor.run());

        Ok(Self { code, sender: tx })
    }

    /// The code players dial to reach this session.
    pub fn room_code(&self) -> &RoomCode {
        &self.code
    }

    /// Registers a player (new or returning) and delivers their
    /// `Welcome` through `sender`.
    pub async fn join(
        &self,
        player_name: impl Into<String>,
        resume_token: Option<String>,
        sender: PlayerSender,
    ) -> Result<OwnerIndex, HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Join {
                player_name: player_name.into(),
                resume_token,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| HostError::Unavailable)?;
        reply_rx.await.map_err(|_| HostError::Unavailable)?
    }

    /// Reports a closed channel. The roster entry survives.
    pub async fn leave(&self, owner: OwnerIndex) -> Result<(), HostError> {
        self.sender
            .send(SessionCommand::Leave { owner })
            .await
            .map_err(|_| HostError::Unavailable)
    }

    /// Draws and broadcasts the next call. `Ok(None)` means the pool is
    /// exhausted; the round is over for calling purposes.
    pub async fn call_next(&self) -> Result<Option<Item>, HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::CallNext { reply: reply_tx })
            .await
            .map_err(|_| HostError::Unavailable)?;
        reply_rx.await.map_err(|_| HostError::Unavailable)
    }

    /// Submits a win claim for verification. Fire-and-forget; outcomes
    /// surface as `BingoAnnounced` or `ClaimRejected` messages.
    pub async fn claim(
        &self,
        owner: OwnerIndex,
        card_id: CardId,
    ) -> Result<(), HostError> {
        self.sender
            .send(SessionCommand::Claim { owner, card_id })
            .await
            .map_err(|_| HostError::Unavailable)
    }

    /// Relays a chat line to every other connected player.
    pub async fn chat(
        &self,
        owner: OwnerIndex,
        message: ChatMessage,
    ) -> Result<(), HostError> {
        self.sender
            .send(SessionCommand::Chat { owner, message })
            .await
            .map_err(|_| HostError::Unavailable)
    }

    /// Routes a decoded client message to the right operation.
    pub async fn handle_client_message(
        &self,
        owner: OwnerIndex,
        msg: ClientMessage,
    ) -> Result<(), HostError> {
        match msg {
            ClientMessage::ClaimBingo { card_id, .. } => {
                self.claim(owner, card_id).await
            }
            ClientMessage::Chat { message } => {
                self.chat(owner, message).await
            }
            // A re-join is handled by the connection layer, which holds
            // the player's sender.
            ClientMessage::JoinRequest { .. } => Ok(()),
        }
    }

    /// Swaps in a fresh round: new state, new cards for every known
    /// player, `NewGame` pushed to each connected one. On error the
    /// current round is left untouched.
    pub async fn new_round(
        &self,
        round: RoundConfig,
    ) -> Result<(), HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::NewRound {
                round,
                reply: reply_tx,
            })
            .await
            .map_err(|_| HostError::Unavailable)?;
        reply_rx.await.map_err(|_| HostError::Unavailable)?
    }

    pub async fn info(&self) -> Result<SessionInfo, HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| HostError::Unavailable)?;
        reply_rx.await.map_err(|_| HostError::Unavailable)
    }

    pub async fn shutdown(&self) -> Result<(), HostError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| HostError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct SessionActor {
    code: RoomCode,
    game: GameState,
    roster: Roster,
    senders: HashMap<OwnerIndex, PlayerSender>,
    card_ids: CardIds,
    chat_seq: u64,
    started: Instant,
    rng: StdRng,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    async fn run(mut self) {
        tracing::info!(code = %self.code, "room session started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join {
                    player_name,
                    resume_token,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(
                        &player_name,
                        resume_token.as_deref(),
                        sender,
                    );
                    let _ = reply.send(result);
                }
                SessionCommand::Leave { owner } => {
                    self.senders.remove(&owner);
                    self.roster.mark_connected(owner, false);
                    tracing::info!(
                        code = %self.code,
                        %owner,
                        "player disconnected, slot retained"
                    );
                }
                SessionCommand::CallNext { reply } => {
                    let _ = reply.send(self.handle_call_next());
                }
                SessionCommand::Claim { owner, card_id } => {
                    self.handle_claim(owner, card_id);
                }
                SessionCommand::Chat { owner, message } => {
                    self.handle_chat(owner, message);
                }
                SessionCommand::NewRound { round, reply } => {
                    let _ = reply.send(self.handle_new_round(round));
                }
                SessionCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Shutdown => {
                    tracing::info!(code = %self.code, "session shutting down");
                    break;
                }
            }
        }

        tracing::info!(code = %self.code, "room session stopped");
    }

    fn handle_join(
        &mut self,
        player_name: &str,
        resume_token: Option<&str>,
        sender: PlayerSender,
    ) -> Result<OwnerIndex, HostError> {
        let resolved =
            self.roster.resolve(player_name, resume_token, &mut self.rng);
        let owner = resolved.owner();

        // A returning player keeps the cards generated at first join;
        // re-joining mid-round never duplicates a card set.
        if self.game.cards_for(owner).is_empty() {
            let cards = generate_cards(
                &self.game.all_items,
                self.game.mode,
                player_name,
                owner,
                &mut self.card_ids,
                &mut self.rng,
            )?;
            self.game.cards.extend(cards);
        }

        // Latest channel wins; a stale one is pruned on next broadcast.
        self.senders.insert(owner, sender);

        let snapshot = self.snapshot_for(owner);
        self.dispatch(
            Recipient::Player(owner),
            ServerMessage::Welcome(snapshot),
        );
        Ok(owner)
    }

    fn handle_call_next(&mut self) -> Option<Item> {
        match self.game.call_next(&mut self.rng) {
            Some(item) => {
                tracing::info!(
                    code = %self.code,
                    call = %item,
                    called = self.game.called_items.len(),
                    "next call"
                );
                self.dispatch(
                    Recipient::All,
                    ServerMessage::NextCall { item: item.clone() },
                );
                Some(item)
            }
            None => {
                tracing::info!(code = %self.code, "item pool exhausted");
                None
            }
        }
    }

    fn handle_claim(&mut self, claimant: OwnerIndex, card_id: CardId) {
        let Some(card) = self.game.card(card_id) else {
            tracing::warn!(
                code = %self.code,
                %claimant,
                %card_id,
                "claim for unknown card"
            );
            self.dispatch(
                Recipient::Player(claimant),
                ServerMessage::ClaimRejected {
                    card_id,
                    reason: "unknown card".into(),
                },
            );
            return;
        };
        let card_owner = card.owner;

        // Duplicate or late claim for an already-recorded winner.
        if self.game.is_winner(card_id) {
            tracing::debug!(
                code = %self.code,
                %card_id,
                "claim for recorded winner ignored"
            );
            return;
        }

        // Truth is re-derived from the called history alone; whatever
        // the client marked locally is irrelevant here.
        let verified = self
            .game
            .verify_card(card_id)
            .unwrap_or(false);

        if verified {
            self.game.record_winner(card_id);
            tracing::info!(
                code = %self.code,
                owner = %card_owner,
                %card_id,
                "bingo verified"
            );
            self.dispatch(
                Recipient::All,
                ServerMessage::BingoAnnounced {
                    owner: card_owner,
                    card_id,
                },
            );
        } else {
            // Operator-side notice; the room at large never hears about
            // failed claims.
            tracing::warn!(
                code = %self.code,
                %claimant,
                %card_id,
                "claim failed verification"
            );
            self.dispatch(
                Recipient::Player(claimant),
                ServerMessage::ClaimRejected {
                    card_id,
                    reason: "no winning pattern on the called history"
                        .into(),
                },
            );
        }
    }

    fn handle_chat(&mut self, from: OwnerIndex, mut message: ChatMessage) {
        self.chat_seq += 1;
        message.id = self.chat_seq;
        message.timestamp = self.started.elapsed().as_millis() as u64;
        if let Some(entry) = self.roster.get(from) {
            message.sender = entry.name.clone();
        }
        self.dispatch(
            Recipient::AllExcept(from),
            ServerMessage::Chat { message },
        );
    }

    fn handle_new_round(
        &mut self,
        round: RoundConfig,
    ) -> Result<(), HostError> {
        // Build and populate the replacement fully before swapping, so a
        // generation failure leaves the running round untouched.
        let mut fresh = round.build_state()?;
        for entry in self.roster.entries() {
            let cards = generate_cards(
                &fresh.all_items,
                fresh.mode,
                &entry.name,
                entry.owner,
                &mut self.card_ids,
                &mut self.rng,
            )?;
            fresh.cards.extend(cards);
        }
        self.game = fresh;

        tracing::info!(
            code = %self.code,
            mode = %self.game.mode,
            players = self.roster.len(),
            "new round started"
        );

        let connected: Vec<OwnerIndex> =
            self.senders.keys().copied().collect();
        for owner in connected {
            let snapshot = self.snapshot_for(owner);
            self.dispatch(
                Recipient::Player(owner),
                ServerMessage::NewGame(snapshot),
            );
        }
        Ok(())
    }

    fn snapshot_for(&self, owner: OwnerIndex) -> RoundSnapshot {
        let (player_name, resume_token) = self
            .roster
            .get(owner)
            .map(|e| (e.name.clone(), e.resume_token.clone()))
            .unwrap_or_default();
        RoundSnapshot {
            owner,
            player_name,
            resume_token,
            cards: self.game.cards_for(owner),
            mode: self.game.mode,
            theme: self.game.theme.clone(),
            prize: self.game.prize.clone(),
            current_call: self.game.current_call.clone(),
            called_items: self.game.called_items.clone(),
            win_patterns: self.game.win_patterns.clone(),
        }
    }

    /// Fans a message out to the resolved recipients. Fire-and-forget:
    /// a failed send marks the player disconnected and prunes the
    /// channel, nothing is queued or retried.
    fn dispatch(&mut self, recipient: Recipient, msg: ServerMessage) {
        let targets: Vec<OwnerIndex> = match recipient {
            Recipient::All => self.senders.keys().copied().collect(),
            Recipient::Player(owner) => vec![owner],
            Recipient::AllExcept(excluded) => self
                .senders
                .keys()
                .copied()
                .filter(|o| *o != excluded)
                .collect(),
        };

        let mut dead = Vec::new();
        for owner in targets {
            if let Some(sender) = self.senders.get(&owner) {
                if sender.send(msg.clone()).is_err() {
                    dead.push(owner);
                }
            }
        }
        for owner in dead {
            self.senders.remove(&owner);
            self.roster.mark_connected(owner, false);
            tracing::debug!(
                code = %self.code,
                %owner,
                "pruned closed channel"
            );
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            room_code: self.code.clone(),
            players: self.roster.len(),
            connected: self.senders.len(),
            called: self.game.called_items.len(),
            remaining: self.game.remaining_items().len(),
            current_call: self.game.current_call.clone(),
            winners: self.game.winner_ids.iter().copied().collect(),
            exhausted: self.game.exhausted(),
        }
    }
}

/// 8 uppercase alphanumeric characters drawn uniformly.
fn generate_room_code(rng: &mut impl Rng) -> RoomCode {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let chars = (0..ROOM_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char);
    // The alphabet only contains valid code characters.
    RoomCode::from_chars(chars).expect("alphabet is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_room_code_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let code = generate_room_code(&mut rng);
        assert_eq!(code.as_str().len(), ROOM_CODE_LEN);
        assert!(
            code.as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_room_code_varies() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = generate_room_code(&mut rng);
        let b = generate_room_code(&mut rng);
        assert_ne!(a, b);
    }
}
