//! End-to-end tests against a local WebSocket server standing in for the
//! Stream Deck application.

use std::sync::Arc;

use deckplug_core::TransportError;
use deckplug_runtime::{
    DeckError, EngineOptions, InboundEvent, Lifecycle, LoopExit, Plugin, PluginConfig,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

const WAIT: Duration = Duration::from_secs(5);

type HostSocket = WebSocketStream<TcpStream>;

/// Listen on an ephemeral port and accept a single WebSocket client
async fn host_server() -> (u16, JoinHandle<HostSocket>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let accept = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        accept_async(stream).await.expect("websocket handshake")
    });
    (port, accept)
}

async fn next_json(socket: &mut HostSocket) -> Value {
    loop {
        let message = timeout(WAIT, socket.next())
            .await
            .expect("message in time")
            .expect("stream open")
            .expect("valid frame");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("json message");
        }
    }
}

fn config(port: u16) -> PluginConfig {
    PluginConfig::new(port, "PLUGIN-UUID", "registerPlugin", "{}").expect("valid config")
}

#[tokio::test]
async fn test_plugin_registers_and_alerts_over_websocket() {
    let (port, accept) = host_server().await;

    let mut plugin = timeout(WAIT, Plugin::connect(config(port), EngineOptions::testing()))
        .await
        .expect("connect in time")
        .expect("connect");
    let mut host = accept.await.expect("accept task");

    assert_eq!(
        next_json(&mut host).await,
        json!({"event": "registerPlugin", "uuid": "PLUGIN-UUID"})
    );

    plugin.register(|_event: Arc<InboundEvent>| async move {
        Err::<(), _>(anyhow::anyhow!("boom"))
    });
    let handle = plugin.spawn(Lifecycle::new());

    host.send(Message::Text(
        json!({"event": "keyDown", "action": "a", "context": "c1", "device": "d"}).to_string(),
    ))
    .await
    .expect("send keyDown");
    assert_eq!(
        next_json(&mut host).await,
        json!({"event": "showAlert", "context": "c1"})
    );

    host.close(Some(CloseFrame {
        code: CloseCode::Away,
        reason: "".into(),
    }))
    .await
    .expect("send close");

    let report = timeout(WAIT, handle.join()).await.expect("plugin stops");
    assert_eq!(report.reader, LoopExit::Closed);
    assert_eq!(report.dispatcher, LoopExit::Closed);
}

#[tokio::test]
async fn test_shutdown_stops_loops_and_sends_close() {
    let (port, accept) = host_server().await;

    let plugin = Plugin::connect(config(port), EngineOptions::testing())
        .await
        .expect("connect");
    let mut host = accept.await.expect("accept task");
    next_json(&mut host).await;

    let lifecycle = Lifecycle::new();
    let handle = plugin.spawn(lifecycle.clone());
    lifecycle.shutdown();

    let report = timeout(WAIT, handle.join()).await.expect("plugin stops");
    assert_eq!(report.reader, LoopExit::Cancelled);
    assert_eq!(report.writer, LoopExit::Cancelled);
    assert_eq!(report.dispatcher, LoopExit::Cancelled);

    let message = timeout(WAIT, host.next())
        .await
        .expect("close in time")
        .expect("stream open");
    assert!(matches!(message, Ok(Message::Close(_))));
}

#[tokio::test]
async fn test_dial_failure_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let err = Plugin::connect(config(port), EngineOptions::testing())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeckError::Transport(TransportError::Connect { .. })
    ));
}
