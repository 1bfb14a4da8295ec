//! Room lifecycle management for ClickRace.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's state and the list of connections subscribed to it. The
//! [`RoomRegistry`] maps room codes to those actors and tracks which
//! connections belong to which rooms so a disconnect can tear them down.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/destroys rooms, routes events by code
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`Room`] — the room state itself (two seats, scores, winner logic)
//! - [`CodeSource`] — where new room codes come from
//! - [`RoomPhase`] — observed lifecycle phase (reported, never enforced)

mod code;
mod config;
mod error;
mod logic;
mod manager;
mod room;

pub use code::{CodeSource, FixedCodes, RandomCodes, generate_code};
pub use config::{RoomConfig, RoomPhase};
pub use error::RoomError;
pub use logic::{Player, Room};
pub use manager::RoomRegistry;
pub use room::{EventSender, RoomHandle, RoomInfo};
