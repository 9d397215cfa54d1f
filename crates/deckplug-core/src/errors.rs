//! Error types for the deckplug runtime
//!
//! This module contains every error type surfaced by the plugin runtime:
//! configuration errors raised before anything is dialed, transport errors from
//! the WebSocket connection, decode/encode errors on the wire format, handler
//! errors reported by application callbacks, and the `DeckError` type that
//! unifies them.

use crate::events::EventName;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Missing or invalid startup inputs
///
/// Always fatal: returned to the caller of startup before any connection is
/// attempted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("missing -port")]
    MissingPort,
    #[error("missing -pluginUUID")]
    MissingPluginUuid,
    #[error("missing -registerEvent")]
    MissingRegisterEvent,
    #[error("missing or invalid -info{}", .source.as_ref().map(|e| format!(": {e}")).unwrap_or_default())]
    MissingOrInvalidInfo {
        #[source]
        source: Option<serde_json::Error>,
    },
    #[error("invalid engine options: {reason}")]
    InvalidOptions { reason: String },
    #[error("cannot load configuration file {path}: {reason}")]
    ConfigFile { path: String, reason: String },
}

/// Connection-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("cannot open websocket connection to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("connection closed{}", .code.map(|c| format!(" (code {c})")).unwrap_or_default())]
    Closed { code: Option<u16>, reason: String },
    #[error("read failed: {reason}")]
    Read { reason: String },
    #[error("write failed: {reason}")]
    Write { reason: String },
    #[error("transport shut down: {reason}")]
    Shutdown { reason: String },
}

impl TransportError {
    /// Whether this error is the peer (or the local reader) closing the
    /// connection, as opposed to an I/O or protocol failure
    pub fn is_closed(&self) -> bool {
        matches!(self, TransportError::Closed { .. })
    }

    /// Whether a close was one of the expected shutdown codes
    ///
    /// Normal (1000), going away (1001), abnormal (1006) and a stream that ended
    /// without a close frame are all treated as the host going away.
    pub fn is_expected_close(&self) -> bool {
        match self {
            TransportError::Closed { code, .. } => {
                matches!(code, None | Some(1000) | Some(1001) | Some(1006))
            }
            _ => false,
        }
    }
}

/// Failure to turn a raw inbound message into an [`crate::InboundEvent`]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event name: {0}")]
    UnknownEvent(String),
    #[error("event {event} is not sent by the host")]
    UnexpectedDirection { event: EventName },
    #[error("invalid payload for {event}: {source}")]
    Payload {
        event: EventName,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported {kind} frame")]
    NonText { kind: &'static str },
}

/// Failure to serialize an outbound event
#[derive(Debug, thiserror::Error)]
#[error("cannot encode event {event}: {source}")]
pub struct EncodeError {
    pub event: String,
    #[source]
    pub source: serde_json::Error,
}

/// An application handler reported failure for an inbound event
///
/// Recovered locally by the dispatcher: logged and surfaced to the user as an
/// alert on the originating context.
#[derive(Debug, thiserror::Error)]
#[error("event [{event}] action [{action}]: {source}")]
pub struct HandlerError {
    pub event: String,
    pub action: String,
    pub context: String,
    #[source]
    pub source: anyhow::Error,
}

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Core error type for the deckplug runtime
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("channel error: {0}")]
    Channel(#[from] crate::channel::ChannelError),
}

/// Result type for deckplug operations
pub type DeckResult<T> = core::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_classification() {
        let going_away = TransportError::Closed {
            code: Some(1001),
            reason: String::new(),
        };
        assert!(going_away.is_closed());
        assert!(going_away.is_expected_close());

        let policy = TransportError::Closed {
            code: Some(1008),
            reason: "policy".to_string(),
        };
        assert!(policy.is_closed());
        assert!(!policy.is_expected_close());

        let read = TransportError::Read {
            reason: "reset".to_string(),
        };
        assert!(!read.is_closed());
        assert!(!read.is_expected_close());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ConfigurationError::MissingPort.to_string(), "missing -port");
        assert_eq!(
            ConfigurationError::MissingOrInvalidInfo { source: None }.to_string(),
            "missing or invalid -info"
        );
        assert_eq!(
            TransportError::Closed {
                code: Some(1001),
                reason: String::new()
            }
            .to_string(),
            "connection closed (code 1001)"
        );

        let err = HandlerError {
            event: "keyDown".to_string(),
            action: "com.example.counter".to_string(),
            context: "c1".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(
            err.to_string(),
            "event [keyDown] action [com.example.counter]: boom"
        );
    }
}
