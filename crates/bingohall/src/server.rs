//! `HallServer` builder and accept loop.
//!
//! The server ties the layers together on the host side: it binds the
//! listener, spawns the one room session this process hosts, and hands
//! every accepted channel to a connection handler task. The operator
//! keeps a [`RoomSession`] handle to drive calls and rounds.

use bingohall_host::{HostConfig, RoomSession, RoundConfig};
use bingohall_transport::{Listener, RoomCode, WebSocketListener};

use crate::HallError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a hall server.
pub struct HallServerBuilder {
    bind_addr: String,
    host_config: HostConfig,
}

impl HallServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            host_config: HostConfig::default(),
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn host_config(mut self, config: HostConfig) -> Self {
        self.host_config = config;
        self
    }

    /// Binds the listener and spawns the room session for `round`.
    ///
    /// # Errors
    /// Fails when the round is invalid (for example a themed pool below
    /// the minimum) or the address cannot be bound.
    pub async fn build(
        self,
        round: RoundConfig,
    ) -> Result<HallServer, HallError> {
        let session =
            RoomSession::spawn(round, self.host_config.clone())?;
        let listener = WebSocketListener::bind(&self.bind_addr).await?;
        tracing::info!(
            addr = %self.bind_addr,
            code = %session.room_code(),
            "hall server ready"
        );
        Ok(HallServer {
            listener,
            session,
            config: self.host_config,
        })
    }
}

impl Default for HallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running hall server: one process, one room.
pub struct HallServer {
    listener: WebSocketListener,
    session: RoomSession,
    config: HostConfig,
}

impl HallServer {
    pub fn builder() -> HallServerBuilder {
        HallServerBuilder::new()
    }

    /// The code players dial to join this room.
    pub fn room_code(&self) -> &RoomCode {
        self.session.room_code()
    }

    /// A handle to the room session for driving calls, rounds, and
    /// shutdown. Cheap to clone; keep one before calling [`run`](Self::run).
    pub fn session(&self) -> RoomSession {
        self.session.clone()
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop. Each accepted channel gets its own handler
    /// task; a failed accept is logged and the loop continues. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), HallError> {
        tracing::info!("hall server accepting players");

        loop {
            match self.listener.accept().await {
                Ok(channel) => {
                    let session = self.session.clone();
                    let join_timeout = self.config.join_timeout;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(
                            channel,
                            session,
                            join_timeout,
                        )
                        .await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
