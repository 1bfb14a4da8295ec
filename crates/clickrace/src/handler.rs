//! Per-connection handler: decode inbound events, apply them to the room
//! registry, and forward room events back out.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! Everything the connection should hear (its own replies and errors plus
//! broadcasts from the rooms it sits in) arrives on one unbounded channel.
//! The handler selects between that channel and the socket.

use std::sync::Arc;

use clickrace_protocol::{ClientEvent, Codec, RoomCode, ServerEvent};
use clickrace_room::{EventSender, RoomError, RoomHandle};
use clickrace_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ClickRaceError;
use crate::server::ServerState;

/// Drop guard that removes a connection's rooms when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct DisconnectGuard<C: Codec> {
    connection: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let connection = self.connection;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let removed = state.rooms.lock().await.remove_player(connection).await;
            if !removed.is_empty() {
                tracing::debug!(%connection, rooms = removed.len(), "disconnect cleanup done");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ClickRaceError> {
    let connection = conn.id();
    tracing::debug!(%connection, "handling new connection");

    let _guard = DisconnectGuard {
        connection,
        state: Arc::clone(&state),
    };
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%connection, "connection closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%connection, error = %e, "recv error");
                        break;
                    }
                };

                let event: ClientEvent = match state.codec.decode(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(%connection, error = %e, "skipping undecodable frame");
                        continue;
                    }
                };

                dispatch(&state, connection, &tx, event).await;
            }
            Some(event) = rx.recv() => {
                let bytes = state.codec.encode(&event)?;
                conn.send(&bytes).await?;
            }
        }
    }

    // _guard drops here → disconnect cleanup fires.
    Ok(())
}

/// Applies one client event to the registry.
///
/// Only `createRoom` and `joinRoom` answer failures with an `error` event.
/// A failed `updateScore`, `startGame` or `endGame` is logged and
/// otherwise dropped.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    connection: ConnectionId,
    tx: &EventSender,
    event: ClientEvent,
) {
    let name = event.name();
    tracing::debug!(%connection, event = name, "inbound event");

    match event {
        ClientEvent::CreateRoom { player_name } => {
            let result = state
                .rooms
                .lock()
                .await
                .create_room(connection, player_name, tx.clone());

            match result {
                Ok(room_code) => reply(tx, ServerEvent::RoomCreated { room_code }),
                Err(e) => reply_error(tx, connection, name, &e),
            }
        }

        ClientEvent::JoinRoom {
            room_code,
            player_name,
        } => {
            let result = {
                let mut rooms = state.rooms.lock().await;
                rooms
                    .join_room(&room_code, connection, player_name, tx.clone())
                    .await
            };

            if let Err(e) = result {
                reply_error(tx, connection, name, &e);
            }
        }

        ClientEvent::UpdateScore {
            room_code,
            player1_score,
            player2_score,
        } => {
            let result = match room(state, &room_code).await {
                Ok(handle) => handle
                    .update_scores(player1_score, player2_score)
                    .await
                    .map(drop),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                log_rejection(connection, name, &e);
            }
        }

        ClientEvent::StartGame { room_code } => {
            let result = match room(state, &room_code).await {
                Ok(handle) => handle.start().await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                log_rejection(connection, name, &e);
            }
        }

        ClientEvent::EndGame { room_code } => {
            let result = match room(state, &room_code).await {
                Ok(handle) => handle.end().await.map(drop),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                log_rejection(connection, name, &e);
            }
        }
    }
}

/// Looks up room `code` and releases the registry before the caller talks
/// to the actor.
async fn room<C: Codec>(
    state: &ServerState<C>,
    code: &RoomCode,
) -> Result<RoomHandle, RoomError> {
    state.rooms.lock().await.room(code)
}

/// Queues `event` for this connection only.
fn reply(tx: &EventSender, event: ServerEvent) {
    // The receiver lives in this connection's own loop.
    let _ = tx.send(event);
}

/// Sends the error's client-facing message to this connection only.
fn reply_error(tx: &EventSender, connection: ConnectionId, event: &str, e: &RoomError) {
    log_rejection(connection, event, e);
    reply(tx, ServerEvent::error(e.to_string()));
}

fn log_rejection(connection: ConnectionId, event: &str, e: &RoomError) {
    let code = e.room_code().map(RoomCode::as_str);
    match e {
        RoomError::Unavailable(_) | RoomError::CodeUnavailable => {
            tracing::warn!(%connection, event, code, error = %e, "room operation failed");
        }
        _ => {
            tracing::debug!(%connection, event, code, error = %e, "room operation rejected");
        }
    }
}
