//! Transport Trait Definitions
//!
//! The connection to the Stream Deck application is split into a read half and
//! a write half so the Reader and Writer tasks each own one exclusively and no
//! lock is needed on the connection itself.
//!
//! ## Implementations
//!
//! - [`crate::websocket`]: the real WebSocket connection (tokio-tungstenite)
//! - [`crate::memory`]: an in-memory pair for tests and embedding

use deckplug_core::TransportError;

// ----------------------------------------------------------------------------
// Messages
// ----------------------------------------------------------------------------

/// One message read from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingMessage {
    Text(String),
    Binary(Vec<u8>),
}

// ----------------------------------------------------------------------------
// Transport Halves
// ----------------------------------------------------------------------------

/// Read half of a plugin connection
#[async_trait::async_trait]
pub trait TransportReader: Send {
    /// Wait for the next message
    ///
    /// Must be cancel-safe: dropping the returned future before it completes
    /// must not lose a message. A closed connection is reported as
    /// [`TransportError::Closed`].
    async fn read_message(&mut self) -> Result<IncomingMessage, TransportError>;

    /// Close the connection from the reading side
    ///
    /// After this the write half fails every write with
    /// [`TransportError::Closed`].
    async fn close(&mut self);
}

/// Write half of a plugin connection
#[async_trait::async_trait]
pub trait TransportWriter: Send {
    /// Write one text message
    async fn write_message(&mut self, text: String) -> Result<(), TransportError>;

    /// Send a close frame and release the connection
    ///
    /// A connection the peer already closed is not an error. Failing to send
    /// the close frame is reported as [`TransportError::Shutdown`].
    async fn close(&mut self) -> Result<(), TransportError>;
}
