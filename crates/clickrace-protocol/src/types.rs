//! Event types for ClickRace's wire format.
//!
//! Every frame is one event, adjacently tagged:
//! `{"event": "<camelCaseName>", "data": {...}}`. Events without a payload
//! omit `data`. Field names inside `data` are camelCase, which is what the
//! browser client reads and writes.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// The short code players type to find each other.
///
/// Freshly generated codes are [`RoomCode::LENGTH`] characters drawn from
/// [`RoomCode::ALPHABET`]. Codes coming from clients are not validated here;
/// an unknown or malformed code simply doesn't match any room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Number of characters in a generated code.
    pub const LENGTH: usize = 6;

    /// Upper-case base-36 digits.
    pub const ALPHABET: &'static [u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Wraps a code as-is.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Trims surrounding whitespace and upper-cases, so `" ab12cd "`
    /// finds room `AB12CD`.
    pub fn normalized(input: &str) -> Self {
        Self(input.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this looks like a code the server could have
    /// generated: right length, only characters from [`Self::ALPHABET`].
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LENGTH
            && self.0.bytes().all(|b| Self::ALPHABET.contains(&b))
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Payload pieces
// ---------------------------------------------------------------------------

/// A player as shown to clients: display name and current score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub score: u32,
}

/// Who won a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player1,
    Player2,
    Tie,
}

impl Winner {
    /// Strict comparison: the higher score wins, equal scores tie.
    pub fn from_scores(player1: u32, player2: u32) -> Self {
        match player1.cmp(&player2) {
            std::cmp::Ordering::Greater => Self::Player1,
            std::cmp::Ordering::Less => Self::Player2,
            std::cmp::Ordering::Equal => Self::Tie,
        }
    }
}

/// Final result broadcast when a game ends.
///
/// `winner_name` is `None` (JSON `null`) on a tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Winner,
    pub winner_name: Option<String>,
    pub player1_score: u32,
    pub player2_score: u32,
    pub player1_name: String,
    pub player2_name: String,
}

// ---------------------------------------------------------------------------
// ClientEvent — client → server
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Open a new room with the sender as player 1.
    CreateRoom { player_name: String },

    /// Take the second seat in an existing room.
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },

    /// Overwrite both scores. Either player may send it; the server keeps
    /// whatever arrives last.
    UpdateScore {
        room_code: RoomCode,
        player1_score: u32,
        player2_score: u32,
    },

    /// Reset scores and tell both clients to start their countdown.
    StartGame { room_code: RoomCode },

    /// The client's countdown ran out: compute and announce the winner.
    EndGame { room_code: RoomCode },
}

impl ClientEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::UpdateScore { .. } => "updateScore",
            Self::StartGame { .. } => "startGame",
            Self::EndGame { .. } => "endGame",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent — server → client
// ---------------------------------------------------------------------------

/// Everything the server tells clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Sent to the creator only.
    RoomCreated { room_code: RoomCode },

    /// Both seats are filled.
    GameStart {
        player1: PlayerSnapshot,
        player2: PlayerSnapshot,
    },

    /// Current scores after an `updateScore`.
    ScoreUpdate {
        player1_score: u32,
        player2_score: u32,
    },

    /// Clients should start their local countdown now.
    StartTimer,

    /// The game ended.
    GameOver(GameResult),

    /// Someone in the room dropped; the room is gone.
    PlayerDisconnected,

    /// A request from this connection failed.
    Error { message: String },
}

impl ServerEvent {
    /// Shorthand for [`ServerEvent::Error`].
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
