//! In-memory transport
//!
//! A connection pair whose far side is a [`HostEnd`] driven by the caller. The
//! host end injects messages and close events, observes everything the plugin
//! writes, and counts read and write attempts so tests can assert that a
//! stopped engine no longer touches the connection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use deckplug_core::TransportError;

use crate::transport::{IncomingMessage, TransportReader, TransportWriter};

type Incoming = Result<IncomingMessage, TransportError>;

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    writer_closed: AtomicBool,
}

/// Create a connected in-memory transport
pub fn memory_transport() -> (MemoryReader, MemoryWriter, HostEnd) {
    let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
    let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
    let closed = CancellationToken::new();
    let counters = Arc::new(Counters::default());

    let reader = MemoryReader {
        incoming: incoming_rx,
        closed: closed.clone(),
        counters: Arc::clone(&counters),
    };
    let writer = MemoryWriter {
        outgoing: outgoing_tx,
        closed: closed.clone(),
        counters: Arc::clone(&counters),
    };
    let host = HostEnd {
        incoming: incoming_tx,
        outgoing: outgoing_rx,
        closed,
        counters,
    };
    (reader, writer, host)
}

// ----------------------------------------------------------------------------
// Plugin Side
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct MemoryReader {
    incoming: mpsc::UnboundedReceiver<Incoming>,
    closed: CancellationToken,
    counters: Arc<Counters>,
}

#[async_trait::async_trait]
impl TransportReader for MemoryReader {
    async fn read_message(&mut self) -> Result<IncomingMessage, TransportError> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        match self.incoming.recv().await {
            Some(message) => message,
            None => Err(TransportError::Closed {
                code: None,
                reason: "host end dropped".to_string(),
            }),
        }
    }

    async fn close(&mut self) {
        self.closed.cancel();
        self.incoming.close();
    }
}

#[derive(Debug)]
pub struct MemoryWriter {
    outgoing: mpsc::UnboundedSender<String>,
    closed: CancellationToken,
    counters: Arc<Counters>,
}

#[async_trait::async_trait]
impl TransportWriter for MemoryWriter {
    async fn write_message(&mut self, text: String) -> Result<(), TransportError> {
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed {
                code: None,
                reason: "connection closed by reader".to_string(),
            });
        }
        if self.counters.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Write {
                reason: "injected write failure".to_string(),
            });
        }
        self.outgoing
            .send(text)
            .map_err(|_| TransportError::Closed {
                code: None,
                reason: "host end dropped".to_string(),
            })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.cancel();
        self.counters.writer_closed.store(true, Ordering::SeqCst);
        if self.counters.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Shutdown {
                reason: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Host Side
// ----------------------------------------------------------------------------

/// The Stream Deck application's side of an in-memory connection
#[derive(Debug)]
pub struct HostEnd {
    incoming: mpsc::UnboundedSender<Incoming>,
    outgoing: mpsc::UnboundedReceiver<String>,
    closed: CancellationToken,
    counters: Arc<Counters>,
}

impl HostEnd {
    /// Deliver a text message to the plugin; false once the reader is gone
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.incoming
            .send(Ok(IncomingMessage::Text(text.into())))
            .is_ok()
    }

    /// Deliver a JSON document as a text message
    pub fn send_json(&self, value: &Value) -> bool {
        self.send_text(value.to_string())
    }

    pub fn send_binary(&self, data: Vec<u8>) -> bool {
        self.incoming.send(Ok(IncomingMessage::Binary(data))).is_ok()
    }

    /// Close the connection with a close frame carrying `code`
    pub fn send_close(&self, code: u16) -> bool {
        self.send_error(TransportError::Closed {
            code: Some(code),
            reason: String::new(),
        })
    }

    /// Make the next read fail with `error`
    pub fn send_error(&self, error: TransportError) -> bool {
        self.incoming.send(Err(error)).is_ok()
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self) {
        self.counters.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Next message written by the plugin; `None` once the writer is gone
    pub async fn next_outgoing(&mut self) -> Option<String> {
        self.outgoing.recv().await
    }

    /// Next message written by the plugin, parsed as JSON
    pub async fn next_outgoing_json(&mut self) -> Option<Value> {
        let text = self.next_outgoing().await?;
        serde_json::from_str(&text).ok()
    }

    /// Message already written by the plugin, without waiting
    pub fn try_next_outgoing(&mut self) -> Option<String> {
        self.outgoing.try_recv().ok()
    }

    /// Number of reads the plugin has started
    pub fn reads_started(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    /// Number of writes the plugin has started
    pub fn writes_started(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }

    /// Whether the plugin side has closed the connection
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Whether the write half sent its close
    pub fn writer_closed(&self) -> bool {
        self.counters.writer_closed.load(Ordering::SeqCst)
    }
}
