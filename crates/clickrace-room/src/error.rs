//! Error types for the room layer.

use clickrace_protocol::RoomCode;

/// Errors that can occur during room operations.
///
/// The `Display` text is what the offending client sees in its `error`
/// event, so it is written for players, not operators. The room code is
/// carried for logging.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists (never created, or already torn down).
    #[error("Invalid room code")]
    NotFound(RoomCode),

    /// Both seats are taken.
    #[error("Room is full")]
    RoomFull(RoomCode),

    /// The operation needs two players but the second seat is empty.
    #[error("Waiting for an opponent")]
    WaitingForOpponent(RoomCode),

    /// The code source kept producing codes of live rooms.
    #[error("Could not allocate a room code")]
    CodeUnavailable,

    /// The room's actor has stopped or its command channel is closed.
    #[error("Room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// The room this error is about, if any.
    pub fn room_code(&self) -> Option<&RoomCode> {
        match self {
            Self::NotFound(code)
            | Self::RoomFull(code)
            | Self::WaitingForOpponent(code)
            | Self::Unavailable(code) => Some(code),
            Self::CodeUnavailable => None,
        }
    }
}
