//! WebSocket transport
//!
//! Thin wrapper around `tokio-tungstenite`: dials the host, splits the stream
//! and maps tungstenite errors onto [`TransportError`]. Ping, pong and raw
//! frames are skipped by the read half.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, error::ProtocolError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use deckplug_core::TransportError;

use crate::transport::{IncomingMessage, TransportReader, TransportWriter};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code reported when the connection dropped without a close handshake
const ABNORMAL_CLOSURE: u16 = 1006;

/// Dial the host's WebSocket server and split the connection
pub async fn connect(url: &str) -> Result<(WebSocketReader, WebSocketWriter), TransportError> {
    let (stream, _response) = connect_async(url)
        .await
        .map_err(|e| TransportError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    debug!(url, "websocket connection established");

    let (sink, stream) = stream.split();
    let closed = CancellationToken::new();
    Ok((
        WebSocketReader {
            stream,
            closed: closed.clone(),
        },
        WebSocketWriter { sink, closed },
    ))
}

// ----------------------------------------------------------------------------
// Read Half
// ----------------------------------------------------------------------------

/// Read half of the WebSocket connection
pub struct WebSocketReader {
    stream: SplitStream<WsStream>,
    closed: CancellationToken,
}

#[async_trait::async_trait]
impl TransportReader for WebSocketReader {
    async fn read_message(&mut self) -> Result<IncomingMessage, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(IncomingMessage::Text(text)),
                Some(Ok(Message::Binary(data))) => return Ok(IncomingMessage::Binary(data)),
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (Some(u16::from(f.code)), f.reason.into_owned()))
                        .unwrap_or((None, String::new()));
                    return Err(TransportError::Closed { code, reason });
                }
                Some(Err(e)) => return Err(read_error(e)),
                None => {
                    return Err(TransportError::Closed {
                        code: None,
                        reason: "stream ended".to_string(),
                    })
                }
            }
        }
    }

    async fn close(&mut self) {
        self.closed.cancel();
    }
}

fn read_error(error: tungstenite::Error) -> TransportError {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed {
                code: None,
                reason: error.to_string(),
            }
        }
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            TransportError::Closed {
                code: Some(ABNORMAL_CLOSURE),
                reason: error.to_string(),
            }
        }
        other => TransportError::Read {
            reason: other.to_string(),
        },
    }
}

// ----------------------------------------------------------------------------
// Write Half
// ----------------------------------------------------------------------------

/// Write half of the WebSocket connection
pub struct WebSocketWriter {
    sink: SplitSink<WsStream, Message>,
    closed: CancellationToken,
}

#[async_trait::async_trait]
impl TransportWriter for WebSocketWriter {
    async fn write_message(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed {
                code: None,
                reason: "connection closed by reader".to_string(),
            });
        }

        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| match e {
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                    TransportError::Closed {
                        code: None,
                        reason: e.to_string(),
                    }
                }
                other => TransportError::Write {
                    reason: other.to_string(),
                },
            })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.cancel();
        let sent = self.sink.send(Message::Close(None)).await;
        let flushed = self.sink.close().await;
        sent.and(flushed).or_else(|e| match e {
            tungstenite::Error::ConnectionClosed
            | tungstenite::Error::AlreadyClosed
            | tungstenite::Error::Protocol(ProtocolError::SendAfterClosing) => Ok(()),
            other => Err(TransportError::Shutdown {
                reason: other.to_string(),
            }),
        })
    }
}
