//! deckplug runtime
//!
//! Connection engine for Stream Deck plugins. A [`Plugin`] registers with the
//! host over WebSocket, then three tasks run until the connection closes or
//! the [`Lifecycle`] is shut down:
//!
//! ```text
//!   host ──► ReaderTask ──► inbound queue ──► DispatcherTask ──► handler tasks
//!                                                                    │
//!   host ◄── WriterTask ◄── outbound queue ◄──────── Client ◄────────┘
//! ```

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod client;
pub mod handler;
pub mod lifecycle;
pub mod memory;
pub mod plugin;
pub mod tasks;
pub mod transport;
pub mod websocket;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use client::Client;
pub use handler::{Handler, HandlerRegistry};
pub use lifecycle::Lifecycle;
pub use memory::{memory_transport, HostEnd, MemoryReader, MemoryWriter};
pub use plugin::{Plugin, PluginHandle, RunReport};
pub use tasks::{DispatcherTask, HostLog, LoopExit, ReaderTask, WriterTask};
pub use transport::{IncomingMessage, TransportReader, TransportWriter};
pub use websocket::{WebSocketReader, WebSocketWriter};

// Re-exported so applications need a single dependency
pub use deckplug_core::{
    DeckError, DeckResult, EngineOptions, EventName, InboundEvent, InboundPayload,
    OutboundEvent, PluginConfig, Settings, StartupArgs, Target,
};
