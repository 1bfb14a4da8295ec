//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Every mutation of a room goes through its command channel, so commands
//! for the same room are applied one at a time in arrival order. The actor
//! also owns the room's subscriber list and publishes each resulting event
//! to all subscribers.

use std::collections::HashMap;

use clickrace_protocol::{GameResult, PlayerSnapshot, RoomCode, ServerEvent};
use clickrace_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{Player, Room, RoomError, RoomPhase};

/// Channel sender for delivering events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// Each carries a `oneshot` reply channel so the caller learns the outcome
/// after the resulting event has been published.
pub(crate) enum RoomCommand {
    Join {
        player: Player,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    UpdateScores {
        player1_score: u32,
        player2_score: u32,
        reply: oneshot::Sender<(u32, u32)>,
    },
    Start {
        reply: oneshot::Sender<()>,
    },
    End {
        reply: oneshot::Sender<Result<GameResult, RoomError>>,
    },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    /// `departed` dropped; tell everyone else and stop.
    Close {
        departed: ConnectionId,
        reply: oneshot::Sender<()>,
    },
}

/// A snapshot of a room for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: RoomPhase,
    pub player_count: usize,
    pub game_active: bool,
    pub player1: PlayerSnapshot,
    pub player2: Option<PlayerSnapshot>,
    /// Distinct connections receiving this room's events.
    pub subscribers: usize,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: an `mpsc::Sender` plus the room code.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Seats `player` and subscribes `sender`; on success both players
    /// have been sent `gameStart`.
    pub async fn join(&self, player: Player, sender: EventSender) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            player,
            sender,
            reply,
        })
        .await?
    }

    /// Overwrites the scores and publishes `scoreUpdate`. Returns the
    /// stored pair.
    pub async fn update_scores(
        &self,
        player1_score: u32,
        player2_score: u32,
    ) -> Result<(u32, u32), RoomError> {
        self.request(|reply| RoomCommand::UpdateScores {
            player1_score,
            player2_score,
            reply,
        })
        .await
    }

    /// Resets scores and publishes `startTimer`.
    pub async fn start(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Start { reply }).await
    }

    /// Decides the winner and publishes `gameOver`.
    pub async fn end(&self) -> Result<GameResult, RoomError> {
        self.request(|reply| RoomCommand::End { reply }).await?
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Publishes `playerDisconnected` to everyone except `departed` and
    /// stops the actor.
    pub async fn close(&self, departed: ConnectionId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Close { departed, reply })
            .await
    }

    /// Sends a command built around a fresh reply channel and waits for the
    /// answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    subscribers: HashMap<ConnectionId, EventSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until closed.
    async fn run(mut self) {
        tracing::debug!(code = %self.room.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::UpdateScores {
                    player1_score,
                    player2_score,
                    reply,
                } => {
                    let scores = self.handle_update_scores(player1_score, player2_score);
                    let _ = reply.send(scores);
                }
                RoomCommand::Start { reply } => {
                    self.handle_start();
                    let _ = reply.send(());
                }
                RoomCommand::End { reply } => {
                    let result = self.handle_end();
                    let _ = reply.send(result);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Close { departed, reply } => {
                    self.handle_close(departed);
                    let _ = reply.send(());
                    break;
                }
            }
        }

        tracing::debug!(code = %self.room.code(), "room actor stopped");
    }

    fn handle_join(&mut self, player: Player, sender: EventSender) -> Result<(), RoomError> {
        let connection = player.connection;
        let (player1, player2) = self.room.join(player)?;
        // A connection seated twice keeps its first sender.
        self.subscribers.entry(connection).or_insert(sender);

        tracing::info!(
            code = %self.room.code(),
            player1 = %player1.name,
            player2 = %player2.name,
            phase = %self.room.phase(),
            "second player joined"
        );

        self.publish(ServerEvent::GameStart { player1, player2 });
        Ok(())
    }

    fn handle_update_scores(&mut self, player1_score: u32, player2_score: u32) -> (u32, u32) {
        let (player1_score, player2_score) =
            self.room.update_scores(player1_score, player2_score);
        tracing::debug!(
            code = %self.room.code(),
            player1_score,
            player2_score,
            "scores updated"
        );
        self.publish(ServerEvent::ScoreUpdate {
            player1_score,
            player2_score,
        });
        (player1_score, player2_score)
    }

    fn handle_start(&mut self) {
        self.room.start();
        tracing::info!(
            code = %self.room.code(),
            players = self.room.player_count(),
            phase = %self.room.phase(),
            "game started"
        );
        self.publish(ServerEvent::StartTimer);
    }

    fn handle_end(&mut self) -> Result<GameResult, RoomError> {
        let result = self.room.end()?;
        tracing::info!(
            code = %self.room.code(),
            player1 = %result.player1_name,
            player1_score = result.player1_score,
            player2 = %result.player2_name,
            player2_score = result.player2_score,
            winner = result.winner_name.as_deref().unwrap_or("Tie"),
            phase = %self.room.phase(),
            "game over"
        );
        self.publish(ServerEvent::GameOver(result.clone()));
        Ok(result)
    }

    fn handle_close(&mut self, departed: ConnectionId) {
        self.subscribers.remove(&departed);
        self.publish(ServerEvent::PlayerDisconnected);
        self.subscribers.clear();
    }

    /// Sends `event` to every subscriber. A subscriber whose receiver is
    /// gone is skipped; its own disconnect cleanup will close the room.
    fn publish(&self, event: ServerEvent) {
        for sender in self.subscribers.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.room.code().clone(),
            phase: self.room.phase(),
            player_count: self.room.player_count(),
            game_active: self.room.is_game_active(),
            player1: self.room.player1().snapshot(),
            player2: self.room.player2().map(Player::snapshot),
            subscribers: self.subscribers.len(),
        }
    }
}

/// Spawns a room actor for a new room whose creator listens on `sender`.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(room: Room, sender: EventSender, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = room.code().clone();

    let mut subscribers = HashMap::new();
    subscribers.insert(room.player1().connection, sender);

    let actor = RoomActor {
        room,
        subscribers,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
