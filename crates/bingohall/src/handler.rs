//! Per-connection handler: join handshake and message routing.
//!
//! Each accepted channel gets its own task running this handler:
//!
//!   1. Wait (bounded) for the first `JoinRequest`.
//!   2. Register with the room session; the `Welcome` flows back through
//!      the player's outbound queue.
//!   3. Pump: one task drains the outbound queue onto the channel while
//!      this task decodes inbound frames into session commands.
//!
//! Malformed frames are protocol violations: logged and dropped, never
//! fatal. A closing channel reports `leave`, which keeps the player's
//! roster slot and cards for a later reconnect.

use std::time::Duration;

use tokio::sync::mpsc;

use bingohall_game::OwnerIndex;
use bingohall_host::RoomSession;
use bingohall_protocol::{ClientMessage, Codec, JsonCodec, ProtocolError};
use bingohall_transport::{Channel, WebSocketChannel};

use crate::HallError;

pub(crate) async fn handle_connection(
    channel: WebSocketChannel,
    session: RoomSession,
    join_timeout: Duration,
) -> Result<(), HallError> {
    let chan_id = channel.id();
    let codec = JsonCodec;
    tracing::debug!(%chan_id, "handling new channel");

    // --- Step 1: the first meaningful frame must be a JoinRequest ---
    let (player_name, resume_token) =
        wait_for_join(&channel, &codec, join_timeout).await?;

    // --- Step 2: register; Welcome arrives through the queue ---
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut owner: OwnerIndex = session
        .join(player_name.clone(), resume_token, tx.clone())
        .await?;
    tracing::info!(%chan_id, %owner, name = %player_name, "player online");

    // --- Step 3a: outbound pump ---
    let pump_channel = channel.clone();
    let pump = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let bytes = match codec.encode(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "outbound encode failed");
                    continue;
                }
            };
            if pump_channel.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    // --- Step 3b: inbound loop ---
    loop {
        let data = match channel.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%owner, "channel closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%owner, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                // Protocol violation: drop the frame, keep the session.
                tracing::debug!(%owner, error = %e, "ignoring bad frame");
                continue;
            }
        };

        match msg {
            // Re-join on the same channel (legacy reset flow). The
            // existing pump keeps serving; only the identity resolves
            // again.
            ClientMessage::JoinRequest {
                player_name,
                resume_token,
            } => {
                match session
                    .join(player_name, resume_token, tx.clone())
                    .await
                {
                    Ok(o) => owner = o,
                    Err(_) => break,
                }
            }
            other => {
                if session
                    .handle_client_message(owner, other)
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }
    }

    // The roster slot and cards survive; only the live channel goes.
    let _ = session.leave(owner).await;
    pump.abort();
    Ok(())
}

/// Waits for the first `JoinRequest`, dropping any other frame, with a
/// hard bound on how long an unjoined channel may linger.
async fn wait_for_join(
    channel: &WebSocketChannel,
    codec: &JsonCodec,
    join_timeout: Duration,
) -> Result<(String, Option<String>), HallError> {
    let deadline = tokio::time::Instant::now() + join_timeout;

    loop {
        let data = match tokio::time::timeout_at(deadline, channel.recv())
            .await
        {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                return Err(HallError::Protocol(
                    ProtocolError::InvalidMessage(
                        "channel closed before join".into(),
                    ),
                ));
            }
            Ok(Err(e)) => return Err(HallError::Transport(e)),
            Err(_) => {
                return Err(HallError::Protocol(
                    ProtocolError::InvalidMessage(
                        "join timed out".into(),
                    ),
                ));
            }
        };

        match codec.decode::<ClientMessage>(&data) {
            Ok(ClientMessage::JoinRequest {
                player_name,
                resume_token,
            }) => return Ok((player_name, resume_token)),
            Ok(other) => {
                tracing::debug!(
                    ?other,
                    "frame before join ignored, still waiting"
                );
            }
            Err(e) => {
                tracing::debug!(error = %e, "bad frame before join");
            }
        }
    }
}
