//! Wire protocol for Bingohall.
//!
//! This crate defines the closed vocabulary that hosts and players speak:
//!
//! - **Messages** ([`ClientMessage`], [`ServerMessage`], [`RoundSnapshot`],
//!   [`ChatMessage`]) and the fan-out targets ([`Recipient`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) converting messages
//!   to and from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) -> Protocol (messages) -> Host / Client sessions
//! ```
//!
//! The protocol layer knows nothing about channels or sessions; it only
//! serializes. Delivery order is the transport's responsibility: the
//! channel is reliable and ordered, and `NextCall` application order is
//! load-bearing for win evaluation.

mod codec;
mod error;
mod messages;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{
    ChatMessage, ClientMessage, Recipient, RoundSnapshot, ServerMessage,
};
