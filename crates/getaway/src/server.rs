//! `GetawayServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → lobby → rooms.

use std::sync::Arc;

use getaway_protocol::{Codec, JsonCodec};
use getaway_room::{Lobby, LobbyConfig};
use getaway_transport::{Transport, WebSocketTransport};

use crate::GetawayError;
use crate::handler::handle_connection;

/// State shared by every connection task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) lobby: Lobby,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,ignore
/// let server = GetawayServer::builder()
///     .bind("127.0.0.1:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct GetawayServerBuilder {
    bind_addr: String,
    lobby_config: LobbyConfig,
}

impl GetawayServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            lobby_config: LobbyConfig::default(),
        }
    }

    /// Sets the address to listen on. Port 0 picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Binds the listener and starts the registry.
    ///
    /// Uses `JsonCodec` over `WebSocketTransport`, which is what the
    /// browser client speaks. Fails if the lobby's player bounds are
    /// unordered or outside the seat limits.
    pub async fn build(self) -> Result<GetawayServer<JsonCodec>, GetawayError> {
        self.lobby_config.validate()?;
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            lobby: Lobby::new(self.lobby_config),
            codec: JsonCodec,
        });

        Ok(GetawayServer { transport, state })
    }
}

impl Default for GetawayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server. Call [`run()`](Self::run) to start accepting players.
pub struct GetawayServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl GetawayServer<JsonCodec> {
    pub fn builder() -> GetawayServerBuilder {
        GetawayServerBuilder::new()
    }
}

impl<C: Codec> GetawayServer<C> {
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The lobby this server dispatches into.
    pub fn lobby(&self) -> &Lobby {
        &self.state.lobby
    }

    /// Accepts connections forever, one handler task each.
    ///
    /// A failed accept (including a failed WebSocket upgrade) is logged
    /// and the loop carries on.
    pub async fn run(mut self) -> Result<(), GetawayError> {
        tracing::info!("getaway server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
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
