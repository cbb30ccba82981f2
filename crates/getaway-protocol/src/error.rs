//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes were not a valid message, or a payload did not have the
    /// shape its event requires.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The message parsed but is unusable, e.g. an event that needs a
    /// payload arrived without one.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
