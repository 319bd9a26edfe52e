//! The player side of a Bingohall session.
//!
//! A client holds a local shadow of the round and renders from it; the
//! host stays authoritative. This crate is pure state: the async driver
//! that moves bytes lives above it (see the meta crate), feeding decoded
//! messages into [`ClientSession::handle_message`] and reacting to the
//! returned [`ClientEvent`]s.
//!
//! # Key types
//!
//! - [`ClientPhase`] - connection lifecycle state machine
//! - [`ClientSession`] - phase + shadow + the message application loop
//! - [`TableView`] - the local copy of cards, history, and winners
//! - [`MarkMode`] - auto-mark vs. manual daubing

mod error;
mod phase;
mod session;

pub use error::ClientError;
pub use phase::ClientPhase;
pub use session::{ClientEvent, ClientSession, MarkMode, TableView};
