//! Lobby configuration.

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// Fewest seats a room can have. The game needs three hands to be playable.
pub const MIN_SEATS: u8 = 3;

/// Most seats a room can have.
pub const MAX_SEATS: u8 = 6;

/// Settings shared by every room the lobby creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Smallest player count a room may be created with.
    pub min_players: u8,

    /// Largest player count a room may be created with.
    pub max_players: u8,

    /// Length of generated room ids.
    pub room_id_len: usize,

    /// Capacity of the registry's command channel.
    pub registry_channel_size: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 6,
            room_id_len: 16,
            registry_channel_size: 64,
        }
    }
}

impl LobbyConfig {
    /// Checks that the player bounds are ordered and within
    /// [`MIN_SEATS`]..=[`MAX_SEATS`].
    pub fn validate(&self) -> Result<(), RoomError> {
        let seats = MIN_SEATS..=MAX_SEATS;
        let ordered = self.min_players <= self.max_players;
        if !ordered || !seats.contains(&self.min_players) || !seats.contains(&self.max_players) {
            return Err(RoomError::InvalidBounds {
                min: self.min_players,
                max: self.max_players,
            });
        }
        Ok(())
    }

    /// Whether a room may be created for `count` players. Counts outside
    /// the seat limits are refused even if the bounds allow them.
    pub fn allows_player_count(&self, count: u8) -> bool {
        (MIN_SEATS..=MAX_SEATS).contains(&count)
            && (self.min_players..=self.max_players).contains(&count)
    }
}
