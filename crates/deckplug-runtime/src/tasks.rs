//! Engine tasks
//!
//! The three long-running loops of a connected plugin:
//!
//! - [`ReaderTask`]: transport → decode → inbound queue
//! - [`WriterTask`]: outbound queue → encode → transport
//! - [`DispatcherTask`]: inbound queue → one handler task per (event, handler)
//!
//! Every loop checks the lifecycle token before blocking and races its blocking
//! step against cancellation, so a shutdown request is honoured promptly and no
//! further transport operation starts afterwards.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use deckplug_core::{
    DecodeError, HandlerError, InboundEvent, InboundReceiver, InboundSender, NonBlockingSend,
    OutboundEvent, OutboundReceiver, OutboundSender, TransportError,
};

use crate::client::Client;
use crate::handler::Handler;
use crate::transport::{IncomingMessage, TransportReader, TransportWriter};

/// Why an engine loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// The lifecycle signal was raised
    Cancelled,
    /// The upstream side finished: connection closed normally or queue drained
    Closed,
    /// An unrecoverable transport failure
    Failed(TransportError),
    /// The task panicked or was aborted
    Aborted(String),
}

// ----------------------------------------------------------------------------
// Host Log Forwarding
// ----------------------------------------------------------------------------

/// Mirrors selected diagnostics into the Stream Deck log via `logMessage`
///
/// Disabled unless debug mode is on. Never waits on queue capacity so the
/// loops cannot stall on their own diagnostics.
#[derive(Debug, Clone, Default)]
pub struct HostLog {
    sender: Option<OutboundSender>,
}

impl HostLog {
    pub fn new(sender: OutboundSender, enabled: bool) -> Self {
        Self {
            sender: enabled.then_some(sender),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    fn forward(&self, message: String) {
        if let Some(sender) = &self.sender {
            if let Err(e) = sender.try_send_non_blocking(OutboundEvent::log_message(message)) {
                debug!("Dropping host log line: {}", e);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Reader
// ----------------------------------------------------------------------------

/// Reads messages from the connection and feeds decoded events to the dispatcher
pub struct ReaderTask {
    transport: Box<dyn TransportReader>,
    inbound: InboundSender,
    lifecycle: CancellationToken,
    host_log: HostLog,
}

impl ReaderTask {
    pub fn new(
        transport: Box<dyn TransportReader>,
        inbound: InboundSender,
        lifecycle: CancellationToken,
        host_log: HostLog,
    ) -> Self {
        Self {
            transport,
            inbound,
            lifecycle,
            host_log,
        }
    }

    pub async fn run(mut self) -> LoopExit {
        debug!("Reader task started");

        let exit = loop {
            if self.lifecycle.is_cancelled() {
                break LoopExit::Cancelled;
            }

            let message = tokio::select! {
                biased;
                _ = self.lifecycle.cancelled() => break LoopExit::Cancelled,
                message = self.transport.read_message() => message,
            };

            let text = match message {
                Ok(IncomingMessage::Text(text)) => text,
                Ok(IncomingMessage::Binary(data)) => {
                    let err = DecodeError::NonText { kind: "binary" };
                    warn!(bytes = data.len(), "Skipping message: {}", err);
                    continue;
                }
                Err(e) if e.is_expected_close() => {
                    debug!("Connection closed: {}", e);
                    break LoopExit::Closed;
                }
                Err(e) => {
                    error!("Read failed: {}", e);
                    self.host_log.forward(format!("[ERROR] read message: {e}"));
                    break LoopExit::Failed(e);
                }
            };

            let event = match InboundEvent::decode(&text) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping undecodable message: {}", e);
                    self.host_log.forward(format!("[ERROR] decode message: {e}"));
                    continue;
                }
            };

            if self.inbound.send(Arc::new(event)).await.is_err() {
                debug!("Inbound queue closed, reader stopping");
                break if self.lifecycle.is_cancelled() {
                    LoopExit::Cancelled
                } else {
                    LoopExit::Closed
                };
            }
        };

        self.transport.close().await;
        debug!(?exit, "Reader task stopped");
        exit
    }
}

// ----------------------------------------------------------------------------
// Writer
// ----------------------------------------------------------------------------

/// Drains the outbound queue onto the connection
pub struct WriterTask {
    transport: Box<dyn TransportWriter>,
    outbound: OutboundReceiver,
    lifecycle: CancellationToken,
}

impl WriterTask {
    pub fn new(
        transport: Box<dyn TransportWriter>,
        outbound: OutboundReceiver,
        lifecycle: CancellationToken,
    ) -> Self {
        Self {
            transport,
            outbound,
            lifecycle,
        }
    }

    pub async fn run(mut self) -> LoopExit {
        debug!("Writer task started");

        let exit = loop {
            if self.lifecycle.is_cancelled() {
                break LoopExit::Cancelled;
            }

            let event = tokio::select! {
                biased;
                _ = self.lifecycle.cancelled() => break LoopExit::Cancelled,
                event = self.outbound.recv() => match event {
                    Some(event) => event,
                    None => break LoopExit::Closed,
                },
            };

            let context = event.context.as_deref().unwrap_or_default();
            let text = match event.encode() {
                Ok(text) => text,
                Err(e) => {
                    error!(event = %event.event, context, "Encode failed: {}", e);
                    break LoopExit::Failed(TransportError::Write {
                        reason: e.to_string(),
                    });
                }
            };

            if let Err(e) = self.transport.write_message(text).await {
                error!(event = %event.event, context, "Write failed: {}", e);
                break LoopExit::Failed(e);
            }
        };

        // Queued commands are dropped; producers observe a closed queue
        self.outbound.close();
        if let Err(e) = self.transport.close().await {
            debug!("Close frame not sent: {}", e);
        }
        debug!(?exit, "Writer task stopped");
        exit
    }
}

// ----------------------------------------------------------------------------
// Dispatcher
// ----------------------------------------------------------------------------

/// Fans inbound events out to every registered handler
pub struct DispatcherTask {
    inbound: InboundReceiver,
    handlers: Arc<[Arc<dyn Handler>]>,
    client: Client,
    lifecycle: CancellationToken,
    limiter: Option<Arc<Semaphore>>,
    host_log: HostLog,
}

impl DispatcherTask {
    pub fn new(
        inbound: InboundReceiver,
        handlers: Arc<[Arc<dyn Handler>]>,
        client: Client,
        lifecycle: CancellationToken,
        max_in_flight: Option<usize>,
        host_log: HostLog,
    ) -> Self {
        Self {
            inbound,
            handlers,
            client,
            lifecycle,
            limiter: max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
            host_log,
        }
    }

    pub async fn run(mut self) -> LoopExit {
        info!(handlers = self.handlers.len(), "Dispatcher task started");

        let exit = loop {
            if self.lifecycle.is_cancelled() {
                break LoopExit::Cancelled;
            }

            let event = tokio::select! {
                biased;
                _ = self.lifecycle.cancelled() => break LoopExit::Cancelled,
                event = self.inbound.recv() => match event {
                    Some(event) => event,
                    None => break LoopExit::Closed,
                },
            };

            self.dispatch(event);
        };

        info!(?exit, "Dispatcher task stopped");
        exit
    }

    fn dispatch(&self, event: Arc<InboundEvent>) {
        debug!(
            event = event.name(),
            action = %event.action,
            context = %event.context,
            "Received event"
        );
        self.host_log.forward(format!(
            "[DEBUG] received event [{}] for action [{}]",
            event.name(),
            event.action
        ));

        for handler in self.handlers.iter() {
            let handler = Arc::clone(handler);
            let event = Arc::clone(&event);
            let client = self.client.clone();
            let limiter = self.limiter.clone();
            let host_log = self.host_log.clone();
            let lifecycle = self.lifecycle.clone();

            tokio::spawn(async move {
                // A handler still waiting for a slot does not start after shutdown
                let _permit = match limiter {
                    Some(limiter) => tokio::select! {
                        biased;
                        _ = lifecycle.cancelled() => return,
                        permit = limiter.acquire_owned() => match permit {
                            Ok(permit) => Some(permit),
                            Err(_) => return,
                        },
                    },
                    None => None,
                };

                if let Err(source) = handler.handle(Arc::clone(&event)).await {
                    let err = HandlerError {
                        event: event.name().to_string(),
                        action: event.action.clone(),
                        context: event.context.clone(),
                        source,
                    };
                    error!(handler = handler.name(), context = %err.context, "Handler failed: {}", err);
                    host_log.forward(format!("[ERROR] {err}"));

                    if let Err(e) = client.show_alert(&err.context).await {
                        debug!(context = %err.context, "Cannot show alert: {}", e);
                    }
                }
            });
        }
    }
}
