//! Error types for the room layer.

use getaway_cards::Card;
use getaway_protocol::{Event, PlayerId, ProtocolError, RoomId};

/// Errors that can occur during room operations.
///
/// Every variant is scoped to the request that caused it: the room is left
/// untouched and only the requesting connection hears about it, through
/// [`RoomError::rejection_event`].
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or was closed after everyone left).
    #[error("room {0} doesn't exist")]
    NotFound(RoomId),

    /// Every seat is taken and nobody has left.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The name belongs to an active player in that room.
    #[error("player {0} already exists in room {1}, choose a different name")]
    PlayerExists(PlayerId, RoomId),

    /// The player has no seat in the room.
    #[error("player {0} doesn't belong in room {1}, join the room first")]
    NotSeated(PlayerId, RoomId),

    #[error("only {min}-{max} players are allowed, got {requested}")]
    InvalidPlayerCount { requested: u8, min: u8, max: u8 },

    /// Lobby player bounds that are unordered or outside the seat limits.
    #[error("player bounds {min}-{max} must be ordered and within 3-6")]
    InvalidBounds { min: u8, max: u8 },

    /// The seat is held by a different connection.
    #[error("player {0} is playing from another connection")]
    SeatHeldElsewhere(PlayerId),

    /// The room hasn't been dealt yet.
    #[error("room {0} has no game in progress")]
    NotStarted(RoomId),

    #[error(transparent)]
    Turn(#[from] TurnError),

    /// The request payload was missing or malformed.
    #[error("invalid request: {0}")]
    Protocol(#[from] ProtocolError),

    /// The registry task has stopped.
    #[error("room registry is unavailable")]
    Unavailable,
}

impl RoomError {
    /// The event the rejection is sent back under. The browser client
    /// keys its error handling on these.
    pub fn rejection_event(&self) -> Event {
        match self {
            Self::NotFound(_) => Event::RoomMissing,
            Self::RoomFull(_) => Event::RoomExists,
            Self::PlayerExists(..) => Event::PlayerExists,
            _ => Event::Error,
        }
    }
}

/// Rule violations in the turn engine. A rejected turn never changes the
/// table, a hand, or whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("it's not your turn yet")]
    NotYourTurn,

    #[error("you don't have {0}")]
    CardNotHeld(Card),

    #[error("only the dealer can start a trick")]
    OnlyDealerLeads,

    /// Tried to break suit while holding a card of the suit on the table.
    #[error("illegal move, you have {held} which matches the suit on the table")]
    IllegalMove { held: Card },

    #[error("no game is in progress")]
    GameNotInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use getaway_cards::{Rank, Suit};

    #[test]
    fn test_rejection_events() {
        let room = RoomId::from("r");
        assert_eq!(RoomError::NotFound(room.clone()).rejection_event(), Event::RoomMissing);
        assert_eq!(RoomError::RoomFull(room.clone()).rejection_event(), Event::RoomExists);
        assert_eq!(
            RoomError::PlayerExists(PlayerId::from("ana"), room).rejection_event(),
            Event::PlayerExists
        );
        assert_eq!(
            RoomError::from(TurnError::NotYourTurn).rejection_event(),
            Event::Error
        );
    }

    #[test]
    fn test_illegal_move_names_the_held_card() {
        let err = TurnError::IllegalMove {
            held: Card::new(Rank::Ten, Suit::Heart),
        };
        assert_eq!(
            err.to_string(),
            "illegal move, you have 10♥ which matches the suit on the table"
        );
    }
}
