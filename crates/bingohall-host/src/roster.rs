//! Player roster: owner-index allocation and reconnection identity.
//!
//! The roster is the session's record of who has ever joined this round.
//! Entries are never removed while the round runs: a dropped channel
//! leaves the owner index and cards in place so the player can resume.
//!
//! Identity resolution on `JoinRequest` goes resume-token first, then
//! case-insensitive display name, then a brand-new entry with the
//! smallest unused owner index.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use bingohall_game::OwnerIndex;

/// One known player in the current session.
#[derive(Debug, Clone)]
pub struct PlayerEntry {
    pub owner: OwnerIndex,
    pub name: String,
    /// Secret issued in every `Welcome`; presenting it on a later join
    /// reclaims this owner index regardless of display name.
    pub resume_token: String,
    pub connected: bool,
}

/// How a join request resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A known player reclaimed their slot (by token or name).
    Returning(OwnerIndex),
    /// A new slot was allocated.
    New(OwnerIndex),
}

impl Resolved {
    pub fn owner(self) -> OwnerIndex {
        match self {
            Self::Returning(o) | Self::New(o) => o,
        }
    }
}

/// All players known to the session, keyed by owner index.
#[derive(Debug, Default)]
pub struct Roster {
    players: BTreeMap<OwnerIndex, PlayerEntry>,
    /// Token index kept in sync with `players`.
    tokens: HashMap<String, OwnerIndex>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a join request to an owner index, allocating a new entry
    /// when neither the token nor the name matches. The resolved entry
    /// is marked connected.
    pub fn resolve(
        &mut self,
        name: &str,
        resume_token: Option<&str>,
        rng: &mut impl Rng,
    ) -> Resolved {
        if let Some(owner) = resume_token
            .and_then(|t| self.tokens.get(t))
            .copied()
        {
            self.mark_connected(owner, true);
            tracing::info!(%owner, name, "player resumed by token");
            return Resolved::Returning(owner);
        }

        if let Some(owner) = self.find_by_name(name) {
            self.mark_connected(owner, true);
            tracing::info!(%owner, name, "player resumed by name");
            return Resolved::Returning(owner);
        }

        let owner = self.smallest_unused_index();
        let token = generate_token(rng);
        self.tokens.insert(token.clone(), owner);
        self.players.insert(
            owner,
            PlayerEntry {
                owner,
                name: name.to_string(),
                resume_token: token,
                connected: true,
            },
        );
        tracing::info!(%owner, name, "player joined");
        Resolved::New(owner)
    }

    /// Case-insensitive display-name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<OwnerIndex> {
        self.players
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.owner)
    }

    fn smallest_unused_index(&self) -> OwnerIndex {
        let mut candidate = 0u32;
        while self.players.contains_key(&OwnerIndex(candidate)) {
            candidate += 1;
        }
        OwnerIndex(candidate)
    }

    pub fn get(&self, owner: OwnerIndex) -> Option<&PlayerEntry> {
        self.players.get(&owner)
    }

    /// Flips connection state. Never removes the entry; disconnects do
    /// not reclaim owner indices within a round.
    pub fn mark_connected(&mut self, owner: OwnerIndex, connected: bool) {
        if let Some(entry) = self.players.get_mut(&owner) {
            entry.connected = connected;
        }
    }

    /// Every known player, connected or not, in owner order.
    pub fn entries(&self) -> impl Iterator<Item = &PlayerEntry> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.players.values().filter(|p| p.connected).count()
    }
}

/// 32 hex characters, 128 bits of entropy. Only the host and the one
/// client ever see a given token.
pub(crate) fn generate_token(rng: &mut impl Rng) -> String {
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
