//! # ClickRace
//!
//! Real-time server for a two-player clicking game.
//!
//! One player opens a room and gets a six-character code; a second player
//! joins with that code. The server relays scores between the two and
//! announces the winner when a client reports that the countdown ran out.
//!
//! Layers, bottom up:
//!
//! - [`clickrace_transport`] — WebSocket connections
//! - [`clickrace_protocol`] — the JSON event envelope
//! - [`clickrace_room`] — room registry and one actor task per room
//! - this crate — configuration, the accept loop and per-connection handler
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clickrace::prelude::*;
//!
//! # async fn start() -> Result<(), ClickRaceError> {
//! let config = ServerConfig::from_env()?;
//! let server = ClickRaceServer::builder()
//!     .bind(&config.bind_addr())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, DEFAULT_HOST, DEFAULT_PORT, ServerConfig};
pub use error::ClickRaceError;
pub use server::{ClickRaceServer, ClickRaceServerBuilder};

/// Everything needed to configure, start and talk to a server.
pub mod prelude {
    pub use crate::{ClickRaceError, ClickRaceServer, ClickRaceServerBuilder, ServerConfig};

    pub use clickrace_protocol::{
        ClientEvent, GameResult, PlayerSnapshot, RoomCode, ServerEvent, Winner,
    };
    pub use clickrace_room::{CodeSource, FixedCodes, RandomCodes, RoomConfig, RoomError};
}
