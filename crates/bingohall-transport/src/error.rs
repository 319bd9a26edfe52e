/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The room code is not 8 uppercase alphanumeric characters.
    #[error("invalid room code {0:?}")]
    InvalidRoomCode(String),

    /// Dialing the room failed (unreachable host, refused, bad URL).
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The dial attempt exceeded the configured timeout.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// The channel was closed by the peer or the network.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
