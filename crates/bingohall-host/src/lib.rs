//! The host side of a Bingohall session.
//!
//! One process hosts one room. The [`RoomSession`] actor owns the only
//! authoritative [`GameState`](bingohall_game::GameState); every inbound
//! message becomes a command on its queue, so mutations apply atomically
//! and in arrival order. Handles are cheap clones; the connection layer
//! holds one per player task and the operator holds one to drive calls
//! and rounds.
//!
//! # Key types
//!
//! - [`RoomSession`] - spawn the actor, get a handle
//! - [`Roster`] - owner-index allocation and resume tokens
//! - [`RoundConfig`] / [`HostConfig`] - round and session settings
//! - [`AutoCaller`] - interval-driven calling with pause/resume
//! - [`ThemeSource`] - hook producing themed item pools

mod caller;
mod config;
mod error;
mod roster;
mod session;
mod theme;

pub use caller::AutoCaller;
pub use config::{HostConfig, RoundConfig};
pub use error::HostError;
pub use roster::{PlayerEntry, Resolved, Roster};
pub use session::{PlayerSender, RoomSession, SessionInfo};
pub use theme::{StaticThemeSource, ThemeSource, themed_round};
