//! Rooms, the registry that finds them, and the lobby that drives them.
//!
//! Every room is a [`Room`] behind its own `tokio::sync::Mutex`. Handlers
//! hold that lock for a whole operation, broadcast included, so a room
//! processes one message at a time while unrelated rooms run in parallel.
//! The room and connection maps live in a [`Registry`] actor task and are
//! only reachable through a [`RegistryHandle`].
//!
//! # Key types
//!
//! - [`Room`]: seats, hands, the table, and the turn engine
//! - [`GamePhase`]: the game state derived from table and hands
//! - [`TurnOutcome`]: what an accepted card did to the game
//! - [`Registry`] / [`RegistryHandle`]: room id and connection lookups
//! - [`Lobby`]: create, join, play, restart, chat, disconnect
//! - [`LobbyConfig`]: player-count bounds and id generation settings

mod config;
mod error;
mod lobby;
mod player;
mod registry;
mod room;

pub use config::{LobbyConfig, MAX_SEATS, MIN_SEATS};
pub use error::{RoomError, TurnError};
pub use lobby::Lobby;
pub use player::{ClientLink, Player, PlayerSender};
pub use registry::{Registry, RegistryHandle, SharedRoom};
pub use room::{GamePhase, JoinOutcome, RestartVote, Room, TurnOutcome};
