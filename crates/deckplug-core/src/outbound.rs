//! Outbound events
//!
//! Commands sent by the plugin to the Stream Deck application, with
//! constructors for every command in the vocabulary. Absent optional fields are
//! omitted from the encoded JSON.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::EncodeError;
use crate::events::EventName;
use crate::inbound::Settings;

// ----------------------------------------------------------------------------
// Target
// ----------------------------------------------------------------------------

/// Where a title or image is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    #[default]
    HardwareAndSoftware,
    Hardware,
    Software,
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value: u8 = match self {
            Target::HardwareAndSoftware => 0,
            Target::Hardware => 1,
            Target::Software => 2,
        };
        serializer.serialize_u8(value)
    }
}

// ----------------------------------------------------------------------------
// Payloads
// ----------------------------------------------------------------------------

/// Payload of `setTitle`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TitlePayload {
    /// `None` resets the title to the one set by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub target: Target,
    /// `None` applies the title to every state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<u8>,
}

/// Payload of `setImage`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ImagePayload {
    /// Base64 data URI or SVG; `None` resets to the manifest image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<u8>,
}

/// Payload of an outbound event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundPayload {
    Title(TitlePayload),
    Image(ImagePayload),
    State { state: u8 },
    Url { url: String },
    Log { message: String },
    Profile { profile: String },
    /// Settings, feedback values or a Property Inspector message
    Json(Value),
}

// ----------------------------------------------------------------------------
// Outbound Event
// ----------------------------------------------------------------------------

/// An event to send to the Stream Deck application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Only used by the registration message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<OutboundPayload>,
}

impl OutboundEvent {
    /// Create a bare event with the given name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            action: None,
            uuid: None,
            event: event.into(),
            context: None,
            device: None,
            payload: None,
        }
    }

    /// Registration message sent once after the connection opens
    pub fn registration(register_event: &str, plugin_uuid: &str) -> Self {
        let mut event = Self::new(register_event);
        event.uuid = Some(plugin_uuid.to_string());
        event
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_payload(mut self, payload: OutboundPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Encode as a JSON text message
    pub fn encode(&self) -> Result<String, EncodeError> {
        serde_json::to_string(self).map_err(|source| EncodeError {
            event: self.event.clone(),
            source,
        })
    }

    /// Whether this event carries the given vocabulary name
    pub fn is(&self, name: EventName) -> bool {
        self.event == name.as_str()
    }

    // ------------------------------------------------------------------------
    // Command constructors
    // ------------------------------------------------------------------------

    /// Temporarily show an alert icon on an action instance
    pub fn show_alert(context: &str) -> Self {
        Self::new(EventName::ShowAlert).with_context(context)
    }

    /// Temporarily show an OK checkmark on an action instance
    pub fn show_ok(context: &str) -> Self {
        Self::new(EventName::ShowOk).with_context(context)
    }

    /// Change the title of an action instance
    pub fn set_title(context: &str, title: Option<&str>, target: Target, state: Option<u8>) -> Self {
        Self::new(EventName::SetTitle)
            .with_context(context)
            .with_payload(OutboundPayload::Title(TitlePayload {
                title: title.map(str::to_string),
                target,
                state,
            }))
    }

    /// Change the image of an action instance
    pub fn set_image(context: &str, image: Option<&str>, target: Target, state: Option<u8>) -> Self {
        Self::new(EventName::SetImage)
            .with_context(context)
            .with_payload(OutboundPayload::Image(ImagePayload {
                image: image.map(str::to_string),
                target,
                state,
            }))
    }

    /// Change the state of a multi-state action instance
    pub fn set_state(context: &str, state: u8) -> Self {
        Self::new(EventName::SetState)
            .with_context(context)
            .with_payload(OutboundPayload::State { state })
    }

    /// Update layout values of a dial action
    pub fn set_feedback(context: &str, feedback: Value) -> Self {
        Self::new(EventName::SetFeedback)
            .with_context(context)
            .with_payload(OutboundPayload::Json(feedback))
    }

    /// Persist settings for an action instance
    pub fn set_settings(context: &str, settings: Settings) -> Self {
        Self::new(EventName::SetSettings)
            .with_context(context)
            .with_payload(OutboundPayload::Json(Value::Object(settings)))
    }

    /// Request the settings of an action instance (answered by `didReceiveSettings`)
    pub fn get_settings(context: &str) -> Self {
        Self::new(EventName::GetSettings).with_context(context)
    }

    /// Persist plugin-wide settings; `context` is the plugin uuid
    pub fn set_global_settings(context: &str, settings: Settings) -> Self {
        Self::new(EventName::SetGlobalSettings)
            .with_context(context)
            .with_payload(OutboundPayload::Json(Value::Object(settings)))
    }

    /// Request plugin-wide settings; `context` is the plugin uuid
    pub fn get_global_settings(context: &str) -> Self {
        Self::new(EventName::GetGlobalSettings).with_context(context)
    }

    /// Open a URL in the default browser
    pub fn open_url(url: &str) -> Self {
        Self::new(EventName::OpenUrl).with_payload(OutboundPayload::Url {
            url: url.to_string(),
        })
    }

    /// Write a line to the Stream Deck log file
    pub fn log_message(message: impl Into<String>) -> Self {
        Self::new(EventName::LogMessage).with_payload(OutboundPayload::Log {
            message: message.into(),
        })
    }

    /// Switch a device to one of the plugin's read-only profiles
    pub fn switch_to_profile(context: &str, device: &str, profile: &str) -> Self {
        Self::new(EventName::SwitchToProfile)
            .with_context(context)
            .with_device(device)
            .with_payload(OutboundPayload::Profile {
                profile: profile.to_string(),
            })
    }

    /// Send a payload to the Property Inspector of an action instance
    pub fn send_to_property_inspector(context: &str, action: &str, payload: Value) -> Self {
        Self::new(EventName::SendToPropertyInspector)
            .with_context(context)
            .with_action(action)
            .with_payload(OutboundPayload::Json(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoded(event: &OutboundEvent) -> Value {
        serde_json::from_str(&event.encode().unwrap()).unwrap()
    }

    #[test]
    fn test_show_alert_omits_empty_fields() {
        assert_eq!(
            encoded(&OutboundEvent::show_alert("c1")),
            json!({"event": "showAlert", "context": "c1"})
        );
    }

    #[test]
    fn test_registration_message() {
        assert_eq!(
            encoded(&OutboundEvent::registration("registerPlugin", "ABC-123")),
            json!({"event": "registerPlugin", "uuid": "ABC-123"})
        );
    }

    #[test]
    fn test_set_title_payload() {
        let event = OutboundEvent::set_title("ctx", Some("7"), Target::Hardware, None);
        assert!(event.is(EventName::SetTitle));
        assert_eq!(
            encoded(&event),
            json!({"event": "setTitle", "context": "ctx", "payload": {"title": "7", "target": 1}})
        );

        let reset = OutboundEvent::set_title("ctx", None, Target::HardwareAndSoftware, Some(1));
        assert_eq!(
            encoded(&reset),
            json!({"event": "setTitle", "context": "ctx", "payload": {"target": 0, "state": 1}})
        );
    }

    #[test]
    fn test_command_payload_shapes() {
        assert_eq!(
            encoded(&OutboundEvent::set_state("ctx", 1)),
            json!({"event": "setState", "context": "ctx", "payload": {"state": 1}})
        );
        assert_eq!(
            encoded(&OutboundEvent::open_url("https://example.com")),
            json!({"event": "openUrl", "payload": {"url": "https://example.com"}})
        );
        assert_eq!(
            encoded(&OutboundEvent::log_message("hello")),
            json!({"event": "logMessage", "payload": {"message": "hello"}})
        );
        assert_eq!(
            encoded(&OutboundEvent::switch_to_profile("uuid", "dev", "Gaming")),
            json!({"event": "switchToProfile", "context": "uuid", "device": "dev", "payload": {"profile": "Gaming"}})
        );
        assert_eq!(
            encoded(&OutboundEvent::send_to_property_inspector("ctx", "act", json!({"ok": true}))),
            json!({"action": "act", "event": "sendToPropertyInspector", "context": "ctx", "payload": {"ok": true}})
        );

        let mut settings = Settings::new();
        settings.insert("count".to_string(), json!(4));
        assert_eq!(
            encoded(&OutboundEvent::set_settings("ctx", settings)),
            json!({"event": "setSettings", "context": "ctx", "payload": {"count": 4}})
        );
    }
}
