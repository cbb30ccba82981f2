//! Core protocol types for Getaway's wire format.
//!
//! Every message in either direction is a [`GameMessage`] envelope. The
//! `event` field says what happened, `data` carries the client's request
//! payload, and `response` carries the server's view of the room.
//!
//! The JSON field names (`player`, `room`, `msg`, `turnIdx`, `suite`, ...)
//! are fixed by the browser client and are kept through `#[serde(rename)]`.

use std::fmt;

use getaway_cards::Card;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's display name, which is also their identity inside a room.
///
/// Names are normalized on the way in (surrounding whitespace trimmed,
/// lowercased) so `"Ana "` and `"ana"` are the same player. The conversion
/// from `String` does the normalizing, and serde goes through it, so every
/// `PlayerId` that exists is already normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the client sent no usable name.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for PlayerId {
    fn from(raw: String) -> Self {
        Self(normalize(&raw))
    }
}

impl From<&str> for PlayerId {
    fn from(raw: &str) -> Self {
        Self(normalize(raw))
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A room identifier, normalized the same way as [`PlayerId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RoomId {
    fn from(raw: String) -> Self {
        Self(normalize(&raw))
    }
}

impl From<&str> for RoomId {
    fn from(raw: &str) -> Self {
        Self(normalize(raw))
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// What a [`GameMessage`] is about.
///
/// Client requests use `RoomCreate`, `PlayerJoin`, `PlayerTurn`,
/// `PlayerMessage` and `NewGameRequest`. The server echoes those back on
/// success and adds the rejection and announcement events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    RoomCreate,
    PlayerJoin,
    PlayerTurn,
    PlayerMessage,
    NewGameRequest,

    /// Announced when a player empties their hand and exits the game.
    PlayerWin,
    /// Announced when only one card holder is left.
    GameOver,
    /// Announced when a majority asked for a new game and cards were redealt.
    GameRestart,

    /// Rejection: a room with the requested id already exists.
    RoomExists,
    /// Rejection: the requested room does not exist.
    RoomMissing,
    /// Rejection: the name is taken by an active player in that room.
    PlayerExists,
    /// Rejection for everything else (room full, illegal move, ...).
    Error,

    /// Any event name this server doesn't know. Decoding still succeeds so
    /// the handler can ignore the message instead of dropping the connection.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The envelope every message travels in.
///
/// `msg` is always serialized, even when empty: the client treats any
/// non-empty `msg` as a rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMessage {
    #[serde(default)]
    pub player: PlayerId,

    #[serde(default)]
    pub room: RoomId,

    pub event: Event,

    /// Request payload sent by clients. Its shape depends on `event`; use
    /// [`GameMessage::payload`] to read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// The server's view of the room after the event.
    #[serde(default)]
    pub response: Option<Response>,

    /// Human-readable text: the rejection reason, or the chat line for
    /// `PlayerMessage`.
    #[serde(default, rename = "msg")]
    pub message: String,
}

impl GameMessage {
    pub fn new(event: Event, player: PlayerId, room: RoomId) -> Self {
        Self {
            player,
            room,
            event,
            data: None,
            response: None,
            message: String::new(),
        }
    }

    /// A message that carries only an event and a reason, used to reject a
    /// request.
    pub fn rejection(event: Event, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::new(event, PlayerId::default(), RoomId::default())
        }
    }

    pub fn with_response(mut self, response: impl Into<Response>) -> Self {
        self.response = Some(response.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_data<T: Serialize>(mut self, data: &T) -> Result<Self, ProtocolError> {
        self.data = Some(serde_json::to_value(data).map_err(ProtocolError::Encode)?);
        Ok(self)
    }

    /// Interprets `data` as the payload type for this message's event.
    ///
    /// # Errors
    /// `InvalidMessage` if there is no payload, `Decode` if it has the
    /// wrong shape.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ProtocolError::InvalidMessage(format!("{} requires data", self.event)))?;
        T::deserialize(data).map_err(ProtocolError::Decode)
    }
}

/// The `response` field. The two shapes share no field names, so they are
/// told apart structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Room(RoomResponse),
    Deal(DealResponse),
}

impl From<RoomResponse> for Response {
    fn from(room: RoomResponse) -> Self {
        Response::Room(room)
    }
}

impl From<DealResponse> for Response {
    fn from(deal: DealResponse) -> Self {
        Response::Deal(deal)
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// `data` of a `RoomCreate` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCreationRequest {
    #[serde(rename = "players")]
    pub player_count: u8,
}

/// `data` of a `PlayerTurn` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub card: Card,
}

// ---------------------------------------------------------------------------
// Server views
// ---------------------------------------------------------------------------

/// One card on the table and who played it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCard {
    #[serde(rename = "id")]
    pub player: PlayerId,
    pub card: Card,
}

/// Room membership, sent after create/join and with game-over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomResponse {
    /// Seated players in seat order.
    #[serde(rename = "players")]
    pub seated: Vec<PlayerId>,

    /// Players who emptied their hand this game, in seat order.
    #[serde(rename = "escaped")]
    pub exited: Vec<PlayerId>,

    #[serde(rename = "max")]
    pub capacity: u8,

    #[serde(rename = "turnIdx")]
    pub current_turn: usize,
}

/// One player's private view of the game after a deal or a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealResponse {
    pub table: Vec<PlayerCard>,
    pub hand: Vec<Card>,

    #[serde(rename = "isDealer")]
    pub is_dealer: bool,

    #[serde(rename = "ourTurn")]
    pub is_your_turn: bool,

    /// Whose turn it is, by name.
    #[serde(rename = "turnPlayer")]
    pub turn_player: PlayerId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use getaway_cards::{Rank, Suit};
    use serde_json::json;

    #[test]
    fn test_ids_are_trimmed_and_lowercased() {
        assert_eq!(PlayerId::from("  Ana  "), PlayerId::from("ana"));
        assert_eq!(RoomId::from("AbC123").as_str(), "abc123");
        assert!(PlayerId::from("   ").is_empty());
    }

    #[test]
    fn test_missing_player_and_room_decode_as_empty() {
        let msg: GameMessage =
            serde_json::from_value(json!({"event": "PlayerMessage", "msg": "hi"})).unwrap();
        assert!(msg.player.is_empty());
        assert!(msg.room.is_empty());
        assert_eq!(msg.message, "hi");
    }

    #[test]
    fn test_unknown_event_decodes() {
        let msg: GameMessage =
            serde_json::from_value(json!({"player": "a", "room": "r", "event": "Dance"}))
                .unwrap();
        assert_eq!(msg.event, Event::Unknown);
    }

    #[test]
    fn test_turn_payload_reads_wire_card() {
        let msg: GameMessage = serde_json::from_value(json!({
            "player": "ana",
            "room": "r",
            "event": "PlayerTurn",
            "data": {"card": {"label": "10", "suite": "h"}}
        }))
        .unwrap();

        let turn: TurnRequest = msg.payload().unwrap();
        assert_eq!(turn.card, Card::new(Rank::Ten, Suit::Heart));
    }

    #[test]
    fn test_payload_without_data_is_invalid() {
        let msg = GameMessage::new(Event::RoomCreate, "ana".into(), RoomId::default());
        let result: Result<RoomCreationRequest, _> = msg.payload();
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_payload_with_wrong_shape_is_decode_error() {
        let msg = GameMessage::new(Event::RoomCreate, "ana".into(), RoomId::default())
            .with_data(&json!({"players": "many"}))
            .unwrap();
        let result: Result<RoomCreationRequest, _> = msg.payload();
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_room_response_wire_shape() {
        let msg = GameMessage::new(Event::PlayerJoin, "bo".into(), "r1".into()).with_response(
            RoomResponse {
                seated: vec!["ana".into(), "bo".into()],
                exited: vec![],
                capacity: 3,
                current_turn: 0,
            },
        );

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "player": "bo",
                "room": "r1",
                "event": "PlayerJoin",
                "response": {"players": ["ana", "bo"], "escaped": [], "max": 3, "turnIdx": 0},
                "msg": ""
            })
        );
    }

    #[test]
    fn test_deal_response_wire_shape_and_decode() {
        let deal = DealResponse {
            table: vec![PlayerCard {
                player: "ana".into(),
                card: Card::ACE_OF_SPADES,
            }],
            hand: vec![Card::new(Rank::Two, Suit::Club)],
            is_dealer: false,
            is_your_turn: true,
            turn_player: "bo".into(),
        };
        let msg = GameMessage::new(Event::PlayerTurn, "bo".into(), "r1".into())
            .with_response(deal.clone());

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value["response"],
            json!({
                "table": [{"id": "ana", "card": {"label": "A", "suite": "s"}}],
                "hand": [{"label": "2", "suite": "c"}],
                "isDealer": false,
                "ourTurn": true,
                "turnPlayer": "bo"
            })
        );

        let decoded: GameMessage = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.response, Some(Response::Deal(deal)));
    }

    #[test]
    fn test_rejection_has_empty_ids_and_null_response() {
        let value = serde_json::to_value(GameMessage::rejection(Event::Error, "room is full"))
            .unwrap();
        assert_eq!(value["player"], "");
        assert_eq!(value["response"], serde_json::Value::Null);
        assert_eq!(value["msg"], "room is full");
    }
}
