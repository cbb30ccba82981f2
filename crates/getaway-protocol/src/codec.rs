//! Codec trait and the JSON implementation.
//!
//! The connection handler only sees bytes from the transport; the codec
//! turns them into [`GameMessage`](crate::GameMessage)s and back.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`, the format the browser client uses.
///
/// ```rust
/// use getaway_protocol::{Codec, Event, GameMessage, JsonCodec, PlayerId, RoomId};
///
/// let codec = JsonCodec;
/// let msg = GameMessage::new(Event::PlayerJoin, PlayerId::from("ana"), RoomId::from("lobby"));
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: GameMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, GameMessage};

    #[test]
    fn test_decode_client_join_message() {
        let raw = br#"{"player":"  Ana ","room":"Lobby","event":"PlayerJoin","data":{}}"#;
        let msg: GameMessage = JsonCodec.decode(raw).unwrap();
        assert_eq!(msg.event, Event::PlayerJoin);
        assert_eq!(msg.player.as_str(), "ana");
        assert_eq!(msg.room.as_str(), "lobby");
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<GameMessage, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_utf8_json() {
        let msg = GameMessage::rejection(Event::RoomMissing, "no such room");
        let bytes = JsonCodec.encode(&msg).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains(r#""event":"RoomMissing""#));
        assert!(text.contains(r#""msg":"no such room""#));
    }
}
