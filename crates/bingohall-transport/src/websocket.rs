//! WebSocket transport via `tokio-tungstenite`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{
    Channel, ChannelId, Connector, DEFAULT_CONNECT_TIMEOUT, Listener,
    RoomCode, TransportError,
};

/// Counter for generating unique channel ids across the process.
static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

type ServerStream =
    tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;
type ClientStream =
    tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

fn next_channel_id() -> ChannelId {
    ChannelId::new(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// One open WebSocket channel, either side.
///
/// Cloning shares the underlying stream; the handler uses one clone for
/// the inbound loop and one for the outbound pump.
#[derive(Clone)]
pub struct WebSocketChannel {
    id: ChannelId,
    ws: Arc<Mutex<WsEither>>,
}

enum WsEither {
    Server(ServerStream),
    Client(ClientStream),
}

impl WsEither {
    async fn send(&mut self, msg: Message) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        use futures_util::SinkExt;
        match self {
            Self::Server(ws) => ws.send(msg).await,
            Self::Client(ws) => ws.send(msg).await,
        }
    }

    async fn next(
        &mut self,
    ) -> Option<Result<Message, tokio_tungstenite::tungstenite::Error>> {
        use futures_util::StreamExt;
        match self {
            Self::Server(ws) => ws.next().await,
            Self::Client(ws) => ws.next().await,
        }
    }

    async fn close(&mut self) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        match self {
            Self::Server(ws) => ws.close(None).await,
            Self::Client(ws) => ws.close(None).await,
        }
    }
}

impl Channel for WebSocketChannel {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = Message::Binary(data.to_vec().into());
        self.ws.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        loop {
            let msg = self.ws.lock().await.next().await;
            match msg {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.ws.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ChannelId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Host-side WebSocket listener.
pub struct WebSocketListener {
    listener: TcpListener,
}

impl WebSocketListener {
    /// Binds to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    /// The address actually bound, useful after binding port 0.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

impl Listener for WebSocketListener {
    type Channel = WebSocketChannel;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Channel, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(
            |e| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            },
        )?;

        let id = next_channel_id();
        tracing::debug!(%id, %addr, "accepted WebSocket channel");

        Ok(WebSocketChannel {
            id,
            ws: Arc::new(Mutex::new(WsEither::Server(ws))),
        })
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Player-side dialer. Maps a room code onto `{base_url}/{code}` and
/// bounds the attempt with a timeout.
pub struct WebSocketConnector {
    base_url: String,
    timeout: Duration,
}

impl WebSocketConnector {
    /// Creates a connector dialing under the given base URL, e.g.
    /// `ws://hall.example:4000`, with the default 10 s timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Connector for WebSocketConnector {
    type Channel = WebSocketChannel;
    type Error = TransportError;

    async fn connect(
        &self,
        code: &RoomCode,
    ) -> Result<Self::Channel, Self::Error> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            code
        );

        let attempt = tokio_tungstenite::connect_async(&url);
        let (ws, _) = tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| TransportError::ConnectTimeout(self.timeout))?
            .map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        let id = next_channel_id();
        tracing::debug!(%id, %code, "dialed room");

        Ok(WebSocketChannel {
            id,
            ws: Arc::new(Mutex::new(WsEither::Client(ws))),
        })
    }
}
