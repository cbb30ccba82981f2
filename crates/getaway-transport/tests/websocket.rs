#![cfg(feature = "websocket")]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use getaway_transport::{
    Connection, Transport, TransportError, WebSocketConnection, WebSocketTransport,
};
use tokio_tungstenite::tungstenite::Message;

type Browser = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// A listener on a free port with one browser connected to it.
async fn pair() -> (WebSocketConnection, Browser) {
    let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", transport.local_addr().unwrap());

    let accepting = tokio::spawn(async move { transport.accept().await.unwrap() });
    let (browser, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    (accepting.await.unwrap(), browser)
}

#[tokio::test]
async fn test_json_goes_out_as_text_frame() {
    let (conn, mut browser) = pair().await;

    conn.send(br#"{"event":"PlayerJoin"}"#).await.unwrap();

    let frame = browser.next().await.unwrap().unwrap();
    assert!(frame.is_text());
    assert_eq!(frame.to_text().unwrap(), r#"{"event":"PlayerJoin"}"#);
}

#[tokio::test]
async fn test_text_and_binary_frames_both_arrive() {
    let (conn, mut browser) = pair().await;

    browser.send(Message::Text("hello".into())).await.unwrap();
    browser.send(Message::Binary(b"world".to_vec().into())).await.unwrap();

    assert_eq!(conn.recv().await.unwrap().as_deref(), Some(&b"hello"[..]));
    assert_eq!(conn.recv().await.unwrap().as_deref(), Some(&b"world"[..]));
}

#[tokio::test]
async fn test_browser_closing_ends_recv() {
    let (conn, mut browser) = pair().await;

    browser.close(None).await.unwrap();

    assert!(conn.recv().await.unwrap().is_none());
    // Saying goodbye to a client that already left isn't an error.
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_connections_get_distinct_ids() {
    let (a, _browser_a) = pair().await;
    let (b, _browser_b) = pair().await;
    assert_ne!(a.id(), b.id());
    assert!(a.peer_addr().ip().is_loopback());
}

#[tokio::test]
async fn test_write_proceeds_while_read_is_parked() {
    let (conn, mut browser) = pair().await;
    let conn = Arc::new(conn);

    let reader = Arc::clone(&conn);
    let parked = tokio::spawn(async move { reader.recv().await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    tokio::time::timeout(Duration::from_secs(1), conn.send(b"deal"))
        .await
        .expect("a parked reader must not block writes")
        .unwrap();
    assert_eq!(browser.next().await.unwrap().unwrap().into_data().as_ref(), b"deal");

    browser.send(Message::Text("turn".into())).await.unwrap();
    assert_eq!(parked.await.unwrap().unwrap().as_deref(), Some(&b"turn"[..]));
}

#[tokio::test]
async fn test_bind_failure_names_address() {
    let taken = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap().to_string();

    let Err(err) = WebSocketTransport::bind(&addr).await else {
        panic!("second bind on {addr} should fail");
    };
    assert!(matches!(err, TransportError::Bind { .. }));
    assert!(err.to_string().contains(&addr));
}
