//! Unified error type for the server.

use getaway_protocol::ProtocolError;
use getaway_room::RoomError;
use getaway_transport::TransportError;

/// Top-level error wrapping every layer's error.
///
/// `#[from]` on each variant lets `?` convert layer errors directly.
#[derive(Debug, thiserror::Error)]
pub enum GetawayError {
    /// Socket-level failure (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encoding or decoding failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room operation was rejected.
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: GetawayError = TransportError::Closed("gone".into()).into();
        assert!(matches!(err, GetawayError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: GetawayError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, GetawayError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err: GetawayError = RoomError::NotFound("lobby".into()).into();
        assert!(matches!(err, GetawayError::Room(_)));
        assert_eq!(err.to_string(), "room lobby doesn't exist");
    }
}
