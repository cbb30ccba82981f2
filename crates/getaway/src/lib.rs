//! # Getaway
//!
//! Server for Getaway, a trick-taking card game played by 3 to 6 players
//! in a browser. Players create or join rooms over a WebSocket, are dealt
//! hands when the room fills, and try to get rid of their cards. The last
//! player holding cards loses, and is dealt the ace of spades (and more,
//! if they keep losing) in the next game.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use getaway::prelude::*;
//!
//! # async fn run() -> Result<(), GetawayError> {
//! let server = GetawayServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::GetawayError;
pub use server::{GetawayServer, GetawayServerBuilder};

/// Re-exports for the common server setup.
pub mod prelude {
    pub use crate::{GetawayError, GetawayServer, GetawayServerBuilder, ServerConfig};
    pub use getaway_protocol::{Event, GameMessage, PlayerId, RoomId};
    pub use getaway_room::LobbyConfig;
}
