//! Wire protocol for ClickRace.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomCode`], etc.) —
//!   the events that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! Every frame carries exactly one event:
//!
//! ```text
//! { "event": "joinRoom", "data": { "roomCode": "AB12CD", "playerName": "ada" } }
//! { "event": "startTimer" }
//! ```
//!
//! The protocol layer knows nothing about connections or rooms.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, GameResult, PlayerSnapshot, RoomCode, ServerEvent, Winner,
};
