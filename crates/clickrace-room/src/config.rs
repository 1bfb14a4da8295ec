//! Registry configuration and the observed room phase.

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Tunables for the [`RoomRegistry`](crate::RoomRegistry).
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Capacity of each room actor's command channel. Callers wait when it
    /// is full.
    pub command_channel_size: usize,

    /// How many candidate codes to draw before giving up on a collision
    /// streak.
    pub max_code_attempts: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            command_channel_size: 64,
            max_code_attempts: 32,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Where a room is in its life, as far as the server can tell.
///
/// ```text
/// WaitingForOpponent → Ready → Active → Finished
///                                ↑         │
///                                └─────────┘  (startGame again)
/// ```
///
/// This is derived from the room's fields and reported in
/// [`RoomInfo`](crate::RoomInfo) and logs. Nothing checks it before
/// applying an event: clients drive the game and may send events in any
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Only the creator is seated.
    WaitingForOpponent,
    /// Both seats filled, no game running yet.
    Ready,
    /// `startGame` received, no `endGame` since.
    Active,
    /// At least one game ended and none is running.
    Finished,
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            Self::Ready => write!(f, "Ready"),
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
