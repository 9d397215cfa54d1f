//! Channel utilities
//!
//! The two queues of the engine are bounded tokio mpsc channels:
//! - inbound: Reader → Dispatcher, carrying decoded events
//! - outbound: any number of producers → Writer, carrying commands
//!
//! Both preserve the order in which values were pushed by a single producer.
//! Dropping every sender (or closing the receiver) is the end-of-stream signal.

use core::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::ChannelConfig;
use crate::inbound::InboundEvent;
use crate::outbound::OutboundEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    ChannelFull,
    ChannelClosed,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::ChannelFull => write!(f, "Channel buffer is full"),
            ChannelError::ChannelClosed => write!(f, "Channel is closed"),
        }
    }
}

impl std::error::Error for ChannelError {}

pub type InboundSender = mpsc::Sender<Arc<InboundEvent>>;
pub type InboundReceiver = mpsc::Receiver<Arc<InboundEvent>>;
pub type OutboundSender = mpsc::Sender<OutboundEvent>;
pub type OutboundReceiver = mpsc::Receiver<OutboundEvent>;

// ----------------------------------------------------------------------------
// Channel Creation Utilities
// ----------------------------------------------------------------------------

/// Create bounded inbound channel (Reader → Dispatcher)
pub fn create_inbound_channel(config: &ChannelConfig) -> (InboundSender, InboundReceiver) {
    mpsc::channel(config.inbound_buffer_size)
}

/// Create bounded outbound channel (producers → Writer)
pub fn create_outbound_channel(config: &ChannelConfig) -> (OutboundSender, OutboundReceiver) {
    mpsc::channel(config.outbound_buffer_size)
}

// ----------------------------------------------------------------------------
// Non-blocking Send Utilities
// ----------------------------------------------------------------------------

/// Non-blocking send for producers that must not wait on queue capacity
pub trait NonBlockingSend<T> {
    fn try_send_non_blocking(&self, message: T) -> Result<(), ChannelError>;
}

impl<T> NonBlockingSend<T> for mpsc::Sender<T> {
    fn try_send_non_blocking(&self, message: T) -> Result<(), ChannelError> {
        self.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ChannelError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => ChannelError::ChannelClosed,
        })
    }
}
