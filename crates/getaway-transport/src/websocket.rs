//! Browser clients over `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{Connection, ConnectionId, Transport, TransportError};

static CONNECTION_COUNTER: AtomicU64 = AtomicU64::new(1);

type Socket = WebSocketStream<TcpStream>;

/// Listens for browsers and upgrades each TCP client to a WebSocket.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<WebSocketConnection, TransportError> {
        let (tcp, peer) = self.listener.accept().await.map_err(TransportError::Accept)?;

        let socket = tokio_tungstenite::accept_async(tcp)
            .await
            .map_err(|e| TransportError::Upgrade {
                peer: peer.to_string(),
                reason: e.to_string(),
            })?;

        let id = ConnectionId::new(CONNECTION_COUNTER.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(conn_id = %id, %peer, "websocket upgraded");
        Ok(WebSocketConnection::split(id, peer, socket))
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// One upgraded client.
///
/// Reading and writing lock separate halves of the socket.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    outgoing: Mutex<SplitSink<Socket, Message>>,
    incoming: Mutex<SplitStream<Socket>>,
}

impl WebSocketConnection {
    fn split(id: ConnectionId, peer: SocketAddr, socket: Socket) -> Self {
        let (outgoing, incoming) = socket.split();
        Self {
            id,
            peer,
            outgoing: Mutex::new(outgoing),
            incoming: Mutex::new(incoming),
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn write_error(&self, e: tungstenite::Error) -> TransportError {
        match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::Closed(self.id.to_string())
            }
            other => TransportError::Write(other.to_string()),
        }
    }
}

/// Turns an outbound payload into a frame. The browser client parses
/// text frames, so anything that is valid UTF-8 goes out as text.
fn frame(data: &[u8]) -> Message {
    match String::from_utf8(data.to_vec()) {
        Ok(text) => Message::Text(text.into()),
        Err(raw) => Message::Binary(raw.into_bytes().into()),
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut outgoing = self.outgoing.lock().await;
        outgoing.send(frame(data)).await.map_err(|e| self.write_error(e))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut incoming = self.incoming.lock().await;
        while let Some(next) = incoming.next().await {
            match next {
                Ok(Message::Text(text)) => return Ok(Some(text.as_bytes().to_vec())),
                Ok(Message::Binary(bytes)) => return Ok(Some(bytes.to_vec())),
                Ok(Message::Close(_)) => return Ok(None),
                // Pings are answered by tungstenite itself.
                Ok(_) => {}
                Err(tungstenite::Error::ConnectionClosed) => return Ok(None),
                Err(e) => return Err(TransportError::Read(e.to_string())),
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        let goodbye = Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        }));
        let mut outgoing = self.outgoing.lock().await;
        match outgoing.send(goodbye).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::Write(e.to_string())),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
