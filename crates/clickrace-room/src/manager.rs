//! Room registry: creates, tracks, and routes events to rooms by code.

use std::collections::HashMap;

use clickrace_protocol::RoomCode;
use clickrace_transport::ConnectionId;

use crate::room::spawn_room;
use crate::{
    CodeSource, EventSender, Player, RandomCodes, Room, RoomConfig, RoomError, RoomHandle,
    RoomInfo,
};

/// A live room plus the connections seated in it.
struct RoomEntry {
    handle: RoomHandle,
    /// Connections holding a seat, in seating order. A connection that
    /// joined its own room appears twice.
    members: Vec<ConnectionId>,
}

/// Manages all live rooms and which connections sit in them.
///
/// This is the entry point for room operations from the connection
/// handler. Codes arriving from clients are normalized before lookup, so
/// `" ab12cd"` finds room `AB12CD`.
pub struct RoomRegistry {
    /// Live rooms, keyed by code.
    rooms: HashMap<RoomCode, RoomEntry>,
    codes: Box<dyn CodeSource>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry drawing random codes.
    pub fn new() -> Self {
        Self::with_code_source(RandomCodes::new())
    }

    /// Creates an empty registry that takes its codes from `codes`.
    pub fn with_code_source(codes: impl CodeSource) -> Self {
        Self::with_config(RoomConfig::default(), codes)
    }

    pub fn with_config(config: RoomConfig, codes: impl CodeSource) -> Self {
        Self {
            rooms: HashMap::new(),
            codes: Box::new(codes),
            config,
        }
    }

    /// Opens a room with `name` in the first seat and subscribes `sender`
    /// to its events. Returns the new room's code.
    ///
    /// A candidate code that belongs to a live room is discarded and
    /// another is drawn.
    ///
    /// # Errors
    /// [`RoomError::CodeUnavailable`] if every attempt collided.
    pub fn create_room(
        &mut self,
        connection: ConnectionId,
        name: impl Into<String>,
        sender: EventSender,
    ) -> Result<RoomCode, RoomError> {
        let code = self.allocate_code()?;
        let creator = Player::new(connection, name);
        tracing::info!(%code, %connection, player = %creator.name, "room created");

        let room = Room::new(code.clone(), creator);
        let handle = spawn_room(room, sender, self.config.command_channel_size);
        self.rooms.insert(
            code.clone(),
            RoomEntry {
                handle,
                members: vec![connection],
            },
        );
        Ok(code)
    }

    /// Seats `name` as the second player of room `code` and subscribes
    /// `sender`. Both players receive `gameStart` before this returns.
    pub async fn join_room(
        &mut self,
        code: &RoomCode,
        connection: ConnectionId,
        name: impl Into<String>,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let code = RoomCode::normalized(code.as_str());
        let entry = self
            .rooms
            .get_mut(&code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        entry
            .handle
            .join(Player::new(connection, name), sender)
            .await?;
        entry.members.push(connection);
        Ok(())
    }

    /// Returns a handle to room `code` for `updateScore`, `startGame` and
    /// `endGame`. The handle stays usable after the registry lock is
    /// released; if the room closes meanwhile its calls fail with
    /// [`RoomError::Unavailable`].
    pub fn room(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.lookup(code).cloned()
    }

    pub async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        self.lookup(code)?.info().await
    }

    /// Tears down every room `connection` sits in. The other subscribers of
    /// each room receive `playerDisconnected`. Returns the removed codes.
    pub async fn remove_player(&mut self, connection: ConnectionId) -> Vec<RoomCode> {
        let codes: Vec<RoomCode> = self
            .rooms
            .iter()
            .filter(|(_, entry)| entry.members.contains(&connection))
            .map(|(code, _)| code.clone())
            .collect();

        for code in &codes {
            let Some(entry) = self.rooms.remove(code) else {
                continue;
            };
            if let Err(e) = entry.handle.close(connection).await {
                tracing::warn!(%code, error = %e, "room actor gone before close");
            }
            tracing::info!(%code, %connection, "room destroyed after disconnect");
        }

        codes
    }

    /// Returns `true` if a room with this code is live.
    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms
            .contains_key(&RoomCode::normalized(code.as_str()))
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns the codes of all live rooms, sorted.
    pub fn room_codes(&self) -> Vec<RoomCode> {
        let mut codes: Vec<RoomCode> = self.rooms.keys().cloned().collect();
        codes.sort();
        codes
    }

    fn lookup(&self, code: &RoomCode) -> Result<&RoomHandle, RoomError> {
        let code = RoomCode::normalized(code.as_str());
        self.rooms
            .get(&code)
            .map(|entry| &entry.handle)
            .ok_or(RoomError::NotFound(code))
    }

    fn allocate_code(&mut self) -> Result<RoomCode, RoomError> {
        for attempt in 1..=self.config.max_code_attempts {
            let candidate = self.codes.next_code();
            if !self.rooms.contains_key(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(code = %candidate, attempt, "room code collision, redrawing");
        }
        tracing::warn!(
            attempts = self.config.max_code_attempts,
            "no free room code"
        );
        Err(RoomError::CodeUnavailable)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
