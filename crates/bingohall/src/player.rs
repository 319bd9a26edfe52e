//! Player-side channel driver.
//!
//! [`ClientSession`] is pure state; these functions do its I/O: dial the
//! room, send the join, then loop frames into the session and ship back
//! whatever the caller decides to send in response to events.

use bingohall_client::{ClientEvent, ClientSession};
use bingohall_protocol::{ClientMessage, Codec, JsonCodec};
use bingohall_transport::{
    Channel, Connector, RoomCode, TransportError,
};

use crate::HallError;

/// Dials the room and performs the join handshake up to the point of
/// waiting for `Welcome`. On any failure the session lands in its
/// `Error` phase, from which a retry may start.
pub async fn dial_room<C>(
    connector: &C,
    code: &RoomCode,
    session: &mut ClientSession,
) -> Result<C::Channel, HallError>
where
    C: Connector<Error = TransportError>,
    C::Channel: Channel<Error = TransportError>,
{
    session.begin_connect()?;

    let channel = match connector.connect(code).await {
        Ok(channel) => channel,
        Err(e) => {
            session.fail(&e.to_string());
            return Err(e.into());
        }
    };

    let join = session.channel_opened()?;
    send(&channel, &join).await.inspect_err(|e| {
        session.fail(&e.to_string());
    })?;

    Ok(channel)
}

/// Drives the session until the channel closes or errors.
///
/// Every event is handed to `react`, which returns the messages to send
/// back (claims, chat). A `RejoinRequired` event automatically re-sends
/// the `JoinRequest` before `react` runs.
pub async fn drive_player<Ch, F>(
    channel: &Ch,
    session: &mut ClientSession,
    mut react: F,
) -> Result<(), HallError>
where
    Ch: Channel<Error = TransportError>,
    F: FnMut(&ClientSession, &ClientEvent) -> Vec<ClientMessage>,
{
    let codec = JsonCodec;

    loop {
        let data = match channel.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                session.fail("channel closed");
                return Ok(());
            }
            Err(e) => {
                session.fail(&e.to_string());
                return Err(e.into());
            }
        };

        let msg = match codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring bad frame");
                continue;
            }
        };

        let Some(event) = session.handle_message(msg) else {
            continue;
        };

        if event == ClientEvent::RejoinRequired {
            send(channel, &session.join_request()).await?;
        }

        for outbound in react(session, &event) {
            send(channel, &outbound).await?;
        }
    }
}

async fn send<Ch>(
    channel: &Ch,
    msg: &ClientMessage,
) -> Result<(), HallError>
where
    Ch: Channel<Error = TransportError>,
{
    let bytes = JsonCodec.encode(msg)?;
    channel.send(&bytes).await?;
    Ok(())
}
