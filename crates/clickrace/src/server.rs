//! `ClickRaceServer` builder and server loop.
//!
//! This is the entry point for running a ClickRace server. It ties
//! together all the layers: transport → protocol → room registry.

use std::sync::Arc;
use std::time::Duration;

use clickrace_protocol::{Codec, JsonCodec};
use clickrace_room::{CodeSource, RandomCodes, RoomConfig, RoomRegistry};
use clickrace_transport::{
    DEFAULT_HANDSHAKE_TIMEOUT, Incoming, Transport, WebSocketTransport,
};
use tokio::sync::Mutex;

use crate::ClickRaceError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a ClickRace server.
///
/// # Example
///
/// ```rust,no_run
/// use clickrace::prelude::*;
///
/// # async fn run() -> Result<(), ClickRaceError> {
/// let server = ClickRaceServer::builder()
///     .bind("0.0.0.0:3001")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ClickRaceServerBuilder {
    bind_addr: String,
    handshake_timeout: Duration,
    room_config: RoomConfig,
    codes: Option<Box<dyn CodeSource>>,
}

impl ClickRaceServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            room_config: RoomConfig::default(),
            codes: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how long a new peer gets to finish the WebSocket upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the room registry configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Replaces the random room code source. Tests use this to know codes
    /// in advance.
    pub fn code_source(mut self, codes: impl CodeSource) -> Self {
        self.codes = Some(Box::new(codes));
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<ClickRaceServer<JsonCodec>, ClickRaceError> {
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_handshake_timeout(self.handshake_timeout);

        let rooms = match self.codes {
            Some(codes) => RoomRegistry::with_config(self.room_config, codes),
            None => RoomRegistry::with_config(self.room_config, RandomCodes::new()),
        };

        let state = Arc::new(ServerState {
            rooms: Mutex::new(rooms),
            codec: JsonCodec,
        });

        Ok(ClickRaceServer { transport, state })
    }
}

impl Default for ClickRaceServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound ClickRace server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ClickRaceServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ClickRaceServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ClickRaceServerBuilder {
        ClickRaceServerBuilder::new()
    }
}

impl<C: Codec> ClickRaceServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a task for each accepted peer that performs the WebSocket
    /// upgrade and then runs the connection handler. A failed accept is
    /// logged and the loop continues; a failed upgrade ends only that
    /// peer's task. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ClickRaceError> {
        tracing::info!(addr = ?self.local_addr().ok(), "ClickRace server listening");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let id = incoming.id();
                        let conn = match incoming.upgrade().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%id, error = %e, "upgrade failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(%id, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
