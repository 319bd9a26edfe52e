//! Session and round configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use bingohall_game::{
    GameError, GameMode, GameState, Item, PatternPreset, standard_pool,
};

// ---------------------------------------------------------------------------
// HostConfig
// ---------------------------------------------------------------------------

/// Settings for the hosting process itself, independent of any round.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// How long a freshly accepted channel may sit silent before its
    /// first `JoinRequest`.
    pub join_timeout: Duration,

    /// Capacity of the session actor's command queue.
    pub command_buffer: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            join_timeout: Duration::from_secs(10),
            command_buffer: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoundConfig
// ---------------------------------------------------------------------------

/// Everything needed to start (or restart) a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    pub mode: GameMode,
    pub theme: String,
    pub prize: String,
    pub items: Vec<Item>,
    pub preset: PatternPreset,
}

impl RoundConfig {
    /// A classic 75-ball round, any line wins.
    pub fn standard() -> Self {
        Self {
            mode: GameMode::Standard,
            theme: String::new(),
            prize: String::new(),
            items: standard_pool(),
            preset: PatternPreset::AnyLine,
        }
    }

    /// A themed round over the given pool, any line wins.
    pub fn themed(theme: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            mode: GameMode::Themed,
            theme: theme.into(),
            prize: String::new(),
            items,
            preset: PatternPreset::AnyLine,
        }
    }

    pub fn with_prize(mut self, prize: impl Into<String>) -> Self {
        self.prize = prize.into();
        self
    }

    pub fn with_preset(mut self, preset: PatternPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Builds the round's fresh state, validating the pattern preset and
    /// the themed pool minimum before anything else happens.
    pub(crate) fn build_state(&self) -> Result<GameState, GameError> {
        GameState::new(
            self.mode,
            self.theme.clone(),
            self.prize.clone(),
            self.items.clone(),
            self.preset.patterns()?,
        )
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::standard()
    }
}
