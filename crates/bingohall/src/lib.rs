//! # Bingohall
//!
//! Host-authoritative live bingo sessions over direct peer channels.
//!
//! One participant hosts a room and holds the only authoritative copy of
//! game state; any number of players dial the room code, hold a local
//! shadow, and ask the host to certify wins. This meta crate wires the
//! layers together:
//!
//! ```text
//! transport (channels)  ->  protocol (messages)  ->  host / client
//! ```
//!
//! ## Hosting
//!
//! ```rust,no_run
//! use bingohall::prelude::*;
//!
//! # async fn run() -> Result<(), bingohall::HallError> {
//! let server = HallServer::builder()
//!     .bind("0.0.0.0:4000")
//!     .build(RoundConfig::standard())
//!     .await?;
//! println!("room code: {}", server.room_code());
//!
//! let session = server.session();
//! tokio::spawn(server.run());
//!
//! // The operator drives calls through the session handle.
//! session.call_next().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod handler;
mod player;
mod server;

pub use error::HallError;
pub use player::{dial_room, drive_player};
pub use server::{HallServer, HallServerBuilder};

pub mod prelude {
    //! Everything a host or player binary typically needs.

    pub use crate::{HallError, HallServer, HallServerBuilder};
    pub use bingohall_client::{
        ClientEvent, ClientPhase, ClientSession, MarkMode, TableView,
    };
    pub use bingohall_game::{
        BingoCard, BingoCell, CardId, GameMode, GameState, Item,
        OwnerIndex, PatternPreset, WinPattern,
    };
    pub use bingohall_host::{
        AutoCaller, HostConfig, RoomSession, RoundConfig,
        StaticThemeSource, ThemeSource, themed_round,
    };
    pub use bingohall_protocol::{
        ChatMessage, ClientMessage, Codec, JsonCodec, RoundSnapshot,
        ServerMessage,
    };
    pub use bingohall_transport::{
        Channel, Connector, Listener, RoomCode, WebSocketChannel,
        WebSocketConnector, WebSocketListener,
    };
}
