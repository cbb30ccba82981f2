use std::io;

/// Failures at the socket level. None of these carry game meaning; the
/// server treats any of them as the end of that client's session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("accepting a client failed: {0}")]
    Accept(#[source] io::Error),

    /// The client connected over TCP but never completed the WebSocket
    /// upgrade.
    #[error("websocket upgrade from {peer} failed: {reason}")]
    Upgrade { peer: String, reason: String },

    #[error("client {0} is gone")]
    Closed(String),

    #[error("writing to client failed: {0}")]
    Write(String),

    #[error("reading from client failed: {0}")]
    Read(String),
}
