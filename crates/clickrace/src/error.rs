//! Unified error type for the ClickRace server.

use clickrace_protocol::ProtocolError;
use clickrace_room::RoomError;
use clickrace_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClickRaceError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, actor gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Bad configuration at startup.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
