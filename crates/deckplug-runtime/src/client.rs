//! Outbound client
//!
//! Cloneable handle that enqueues commands for the Writer. Any task may hold
//! one; commands from a single clone reach the connection in the order they
//! were sent.

use std::sync::Arc;

use serde_json::Value;

use deckplug_core::{
    ChannelError, NonBlockingSend, OutboundEvent, OutboundSender, Settings, Target,
};

#[derive(Debug, Clone)]
pub struct Client {
    sender: OutboundSender,
    plugin_uuid: Arc<str>,
}

impl Client {
    pub fn new(sender: OutboundSender, plugin_uuid: &str) -> Self {
        Self {
            sender,
            plugin_uuid: Arc::from(plugin_uuid),
        }
    }

    /// Connection identity this plugin registered with
    pub fn plugin_uuid(&self) -> &str {
        &self.plugin_uuid
    }

    pub(crate) fn sender(&self) -> OutboundSender {
        self.sender.clone()
    }

    /// Enqueue an event, waiting for queue capacity
    pub async fn send(&self, event: OutboundEvent) -> Result<(), ChannelError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| ChannelError::ChannelClosed)
    }

    /// Enqueue an event without waiting
    pub fn try_send(&self, event: OutboundEvent) -> Result<(), ChannelError> {
        self.sender.try_send_non_blocking(event)
    }

    /// True once the Writer has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub async fn show_alert(&self, context: &str) -> Result<(), ChannelError> {
        self.send(OutboundEvent::show_alert(context)).await
    }

    pub async fn show_ok(&self, context: &str) -> Result<(), ChannelError> {
        self.send(OutboundEvent::show_ok(context)).await
    }

    pub async fn set_title(
        &self,
        context: &str,
        title: Option<&str>,
        target: Target,
        state: Option<u8>,
    ) -> Result<(), ChannelError> {
        self.send(OutboundEvent::set_title(context, title, target, state))
            .await
    }

    /// Set the key image; `image` is a data URI or `None` to restore the default
    pub async fn set_image(
        &self,
        context: &str,
        image: Option<&str>,
        target: Target,
        state: Option<u8>,
    ) -> Result<(), ChannelError> {
        self.send(OutboundEvent::set_image(context, image, target, state))
            .await
    }

    pub async fn set_state(&self, context: &str, state: u8) -> Result<(), ChannelError> {
        self.send(OutboundEvent::set_state(context, state)).await
    }

    pub async fn set_feedback(&self, context: &str, feedback: Value) -> Result<(), ChannelError> {
        self.send(OutboundEvent::set_feedback(context, feedback))
            .await
    }

    pub async fn set_settings(&self, context: &str, settings: Settings) -> Result<(), ChannelError> {
        self.send(OutboundEvent::set_settings(context, settings))
            .await
    }

    pub async fn get_settings(&self, context: &str) -> Result<(), ChannelError> {
        self.send(OutboundEvent::get_settings(context)).await
    }

    /// Global settings are addressed by the plugin's own uuid
    pub async fn set_global_settings(&self, settings: Settings) -> Result<(), ChannelError> {
        self.send(OutboundEvent::set_global_settings(
            &self.plugin_uuid,
            settings,
        ))
        .await
    }

    pub async fn get_global_settings(&self) -> Result<(), ChannelError> {
        self.send(OutboundEvent::get_global_settings(&self.plugin_uuid))
            .await
    }

    pub async fn open_url(&self, url: &str) -> Result<(), ChannelError> {
        self.send(OutboundEvent::open_url(url)).await
    }

    /// Write a line to the Stream Deck log file
    pub async fn log_message(&self, message: impl Into<String>) -> Result<(), ChannelError> {
        self.send(OutboundEvent::log_message(message)).await
    }

    pub async fn switch_to_profile(
        &self,
        device: &str,
        profile: &str,
    ) -> Result<(), ChannelError> {
        self.send(OutboundEvent::switch_to_profile(
            &self.plugin_uuid,
            device,
            profile,
        ))
        .await
    }

    pub async fn send_to_property_inspector(
        &self,
        context: &str,
        action: &str,
        payload: Value,
    ) -> Result<(), ChannelError> {
        self.send(OutboundEvent::send_to_property_inspector(
            context, action, payload,
        ))
        .await
    }
}
