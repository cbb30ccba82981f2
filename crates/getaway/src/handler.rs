//! Per-connection handler: read, decode, dispatch, reject.
//!
//! Each accepted connection gets two tasks:
//!   1. A writer that drains the connection's outbound channel. Rooms
//!      broadcast into that channel, so a slow socket never stalls a
//!      room lock.
//!   2. This reader loop, which decodes messages and dispatches them to
//!      the lobby one at a time, in arrival order.
//!
//! When the read side fails or closes, the player's seat is marked as
//! left through [`Lobby::disconnect`](getaway_room::Lobby::disconnect).

use std::sync::Arc;

use getaway_protocol::{Codec, Event, GameMessage, RoomCreationRequest, TurnRequest};
use getaway_room::{ClientLink, PlayerSender, RoomError};
use getaway_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::GetawayError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GetawayError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (sender, receiver) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), receiver));
    let link = ClientLink::new(conn_id, sender);

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: GameMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode message");
                continue;
            }
        };

        if msg.player.is_empty() {
            tracing::debug!(%conn_id, event = %msg.event, "ignoring message from anonymous player");
            continue;
        }

        tracing::debug!(
            %conn_id,
            player_id = %msg.player,
            room_id = %msg.room,
            event = %msg.event,
            "dispatching"
        );
        if let Err(e) = dispatch(&state, &link, msg).await {
            send_rejection(&link.sender, &e);
        }
    }

    let result = state.lobby.disconnect(conn_id).await;
    writer.abort();
    let _ = conn.close().await;
    result.map_err(GetawayError::from)
}

/// Routes one message to the matching lobby operation.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    link: &ClientLink,
    msg: GameMessage,
) -> Result<(), RoomError> {
    let lobby = &state.lobby;

    match msg.event {
        Event::RoomCreate => {
            // Only needed when the room doesn't exist yet; the lobby
            // reports a missing count in that case.
            let request = msg
                .payload::<RoomCreationRequest>()
                .inspect_err(|e| tracing::debug!(error = %e, "no usable RoomCreate payload"))
                .ok();
            lobby
                .create_room(link.clone(), msg.player, msg.room, request)
                .await?;
        }
        Event::PlayerJoin => {
            lobby.join_room(link.clone(), msg.player, msg.room).await?;
        }
        Event::PlayerTurn => {
            let turn: TurnRequest = msg.payload()?;
            lobby.play_turn(link.conn_id, msg.player, msg.room, turn.card).await?;
        }
        Event::PlayerMessage => {
            lobby.chat(link.conn_id, msg.player, msg.room, msg.message).await?;
        }
        Event::NewGameRequest => {
            lobby.request_restart(link.conn_id, msg.player, msg.room).await?;
        }
        other => {
            tracing::debug!(event = %other, "ignoring event not accepted from clients");
        }
    }

    Ok(())
}

/// Queues a rejection for the requesting connection only.
fn send_rejection(sender: &PlayerSender, err: &RoomError) {
    tracing::debug!(error = %err, "request rejected");
    let _ = sender.send(GameMessage::rejection(err.rejection_event(), err.to_string()));
}

/// Encodes queued messages and writes them to the socket until the
/// channel closes or a write fails.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut receiver: mpsc::UnboundedReceiver<GameMessage>,
) {
    let conn_id = conn.id();
    while let Some(msg) = receiver.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
