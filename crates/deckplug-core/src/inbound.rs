//! Inbound events
//!
//! Decoding happens in two steps: the envelope (`event`, `action`, `context`,
//! `device`, `deviceInfo`) is read first, then the raw `payload` is parsed
//! against the schema selected by the event name. A missing payload decodes to
//! the variant's defaults, so `{"event":"keyDown","context":"c1"}` is valid.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DecodeError;
use crate::events::EventName;

/// Persistent settings attached to an action instance
pub type Settings = Map<String, Value>;

// ----------------------------------------------------------------------------
// Device Info
// ----------------------------------------------------------------------------

/// Hardware family of a connected device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    #[default]
    StreamDeck,
    StreamDeckMini,
    StreamDeckXl,
    StreamDeckMobile,
    CorsairGKeys,
    /// A device type newer than this vocabulary
    Other(u8),
}

impl From<u8> for DeviceType {
    fn from(value: u8) -> Self {
        match value {
            0 => DeviceType::StreamDeck,
            1 => DeviceType::StreamDeckMini,
            2 => DeviceType::StreamDeckXl,
            3 => DeviceType::StreamDeckMobile,
            4 => DeviceType::CorsairGKeys,
            other => DeviceType::Other(other),
        }
    }
}

impl From<DeviceType> for u8 {
    fn from(value: DeviceType) -> Self {
        match value {
            DeviceType::StreamDeck => 0,
            DeviceType::StreamDeckMini => 1,
            DeviceType::StreamDeckXl => 2,
            DeviceType::StreamDeckMobile => 3,
            DeviceType::CorsairGKeys => 4,
            DeviceType::Other(other) => other,
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8((*self).into())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u8::deserialize(deserializer).map(DeviceType::from)
    }
}

/// Number of key columns and rows on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSize {
    pub columns: u8,
    pub rows: u8,
}

/// Device description sent with `deviceDidConnect`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Name given to the device by the user
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub size: DeviceSize,
}

// ----------------------------------------------------------------------------
// Payloads
// ----------------------------------------------------------------------------

/// Position of an action on the device grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub column: u8,
    pub row: u8,
}

/// Payload of `keyDown`, `keyUp`, `willAppear` and `willDisappear`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionPayload {
    pub settings: Settings,
    pub coordinates: Coordinates,
    /// Current state, only present for multi-state actions
    pub state: Option<u8>,
    /// Desired state when triggered from a Multi Action (0 or 1)
    pub user_desired_state: Option<u8>,
    pub is_in_multi_action: bool,
}

/// Payload of `didReceiveSettings`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPayload {
    pub settings: Settings,
    pub coordinates: Coordinates,
    pub is_in_multi_action: bool,
}

/// Payload of `didReceiveGlobalSettings`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettingsPayload {
    pub settings: Settings,
}

/// Title styling chosen by the user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    pub title_alignment: String,
    pub title_color: String,
}

/// Payload of `titleParametersDidChange`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleParametersPayload {
    pub coordinates: Coordinates,
    pub settings: Settings,
    pub state: Option<u8>,
    pub title: String,
    pub title_parameters: TitleParameters,
}

/// Payload of `applicationDidLaunch` and `applicationDidTerminate`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPayload {
    /// Identifier of the monitored application
    pub application: String,
}

/// Payload of an inbound event, keyed by its event name
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    DidReceiveSettings(SettingsPayload),
    DidReceiveGlobalSettings(GlobalSettingsPayload),
    KeyDown(ActionPayload),
    KeyUp(ActionPayload),
    WillAppear(ActionPayload),
    WillDisappear(ActionPayload),
    TitleParametersDidChange(TitleParametersPayload),
    DeviceDidConnect,
    DeviceDidDisconnect,
    ApplicationDidLaunch(ApplicationPayload),
    ApplicationDidTerminate(ApplicationPayload),
    SystemDidWakeUp,
    PropertyInspectorDidAppear,
    PropertyInspectorDidDisappear,
    /// Arbitrary JSON sent by the Property Inspector
    SendToPlugin(Value),
    /// An event name this version does not know, passed through untouched
    Unknown { event: String, payload: Value },
}

impl InboundPayload {
    /// Event name this payload belongs to; `None` for [`InboundPayload::Unknown`]
    pub fn event_name(&self) -> Option<EventName> {
        let name = match self {
            InboundPayload::DidReceiveSettings(_) => EventName::DidReceiveSettings,
            InboundPayload::DidReceiveGlobalSettings(_) => EventName::DidReceiveGlobalSettings,
            InboundPayload::KeyDown(_) => EventName::KeyDown,
            InboundPayload::KeyUp(_) => EventName::KeyUp,
            InboundPayload::WillAppear(_) => EventName::WillAppear,
            InboundPayload::WillDisappear(_) => EventName::WillDisappear,
            InboundPayload::TitleParametersDidChange(_) => EventName::TitleParametersDidChange,
            InboundPayload::DeviceDidConnect => EventName::DeviceDidConnect,
            InboundPayload::DeviceDidDisconnect => EventName::DeviceDidDisconnect,
            InboundPayload::ApplicationDidLaunch(_) => EventName::ApplicationDidLaunch,
            InboundPayload::ApplicationDidTerminate(_) => EventName::ApplicationDidTerminate,
            InboundPayload::SystemDidWakeUp => EventName::SystemDidWakeUp,
            InboundPayload::PropertyInspectorDidAppear => EventName::PropertyInspectorDidAppear,
            InboundPayload::PropertyInspectorDidDisappear => {
                EventName::PropertyInspectorDidDisappear
            }
            InboundPayload::SendToPlugin(_) => EventName::SendToPlugin,
            InboundPayload::Unknown { .. } => return None,
        };
        Some(name)
    }

    /// Event name as it appeared on the wire
    pub fn wire_name(&self) -> &str {
        match self {
            InboundPayload::Unknown { event, .. } => event,
            known => known.event_name().map_or("", |name| name.as_str()),
        }
    }

    fn parse(event: EventName, raw: Option<Value>) -> Result<Self, DecodeError> {
        fn typed<T: DeserializeOwned + Default>(
            event: EventName,
            raw: Option<Value>,
        ) -> Result<T, DecodeError> {
            match raw {
                None | Some(Value::Null) => Ok(T::default()),
                Some(value) => serde_json::from_value(value)
                    .map_err(|source| DecodeError::Payload { event, source }),
            }
        }

        let payload = match event {
            EventName::DidReceiveSettings => {
                InboundPayload::DidReceiveSettings(typed(event, raw)?)
            }
            EventName::DidReceiveGlobalSettings => {
                InboundPayload::DidReceiveGlobalSettings(typed(event, raw)?)
            }
            EventName::KeyDown => InboundPayload::KeyDown(typed(event, raw)?),
            EventName::KeyUp => InboundPayload::KeyUp(typed(event, raw)?),
            EventName::WillAppear => InboundPayload::WillAppear(typed(event, raw)?),
            EventName::WillDisappear => InboundPayload::WillDisappear(typed(event, raw)?),
            EventName::TitleParametersDidChange => {
                InboundPayload::TitleParametersDidChange(typed(event, raw)?)
            }
            EventName::DeviceDidConnect => InboundPayload::DeviceDidConnect,
            EventName::DeviceDidDisconnect => InboundPayload::DeviceDidDisconnect,
            EventName::ApplicationDidLaunch => {
                InboundPayload::ApplicationDidLaunch(typed(event, raw)?)
            }
            EventName::ApplicationDidTerminate => {
                InboundPayload::ApplicationDidTerminate(typed(event, raw)?)
            }
            EventName::SystemDidWakeUp => InboundPayload::SystemDidWakeUp,
            EventName::PropertyInspectorDidAppear => InboundPayload::PropertyInspectorDidAppear,
            EventName::PropertyInspectorDidDisappear => {
                InboundPayload::PropertyInspectorDidDisappear
            }
            EventName::SendToPlugin => InboundPayload::SendToPlugin(raw.unwrap_or(Value::Null)),
            outbound => return Err(DecodeError::UnexpectedDirection { event: outbound }),
        };
        Ok(payload)
    }
}

// ----------------------------------------------------------------------------
// Inbound Event
// ----------------------------------------------------------------------------

/// Envelope shared by every inbound message
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInboundEvent {
    event: String,
    #[serde(default)]
    action: String,
    #[serde(default)]
    context: String,
    #[serde(default)]
    device: String,
    #[serde(default)]
    device_info: Option<DeviceInfo>,
    #[serde(default)]
    payload: Option<Value>,
}

/// A decoded event received from the Stream Deck application
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Unique identifier of the action that triggered the event
    pub action: String,
    /// Opaque value identifying the action instance
    pub context: String,
    /// Opaque value identifying the device
    pub device: String,
    /// Present on `deviceDidConnect`
    pub device_info: Option<DeviceInfo>,
    pub payload: InboundPayload,
}

impl InboundEvent {
    /// Decode one text message received from the host
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let raw: RawInboundEvent = serde_json::from_str(text)?;
        let payload = match raw.event.parse::<EventName>() {
            Ok(event) => InboundPayload::parse(event, raw.payload)?,
            Err(_) => InboundPayload::Unknown {
                event: raw.event,
                payload: raw.payload.unwrap_or(Value::Null),
            },
        };

        Ok(Self {
            action: raw.action,
            context: raw.context,
            device: raw.device,
            device_info: raw.device_info,
            payload,
        })
    }

    /// Event discriminator; `None` when the host sent a name this version does not know
    pub fn event(&self) -> Option<EventName> {
        self.payload.event_name()
    }

    /// Event name as sent by the host
    pub fn name(&self) -> &str {
        self.payload.wire_name()
    }

    /// Settings carried by the event, if its payload has any
    pub fn settings(&self) -> Option<&Settings> {
        match &self.payload {
            InboundPayload::KeyDown(p)
            | InboundPayload::KeyUp(p)
            | InboundPayload::WillAppear(p)
            | InboundPayload::WillDisappear(p) => Some(&p.settings),
            InboundPayload::DidReceiveSettings(p) => Some(&p.settings),
            InboundPayload::DidReceiveGlobalSettings(p) => Some(&p.settings),
            InboundPayload::TitleParametersDidChange(p) => Some(&p.settings),
            _ => None,
        }
    }

    /// Deserialize the event's settings into an application type
    ///
    /// Returns `Ok(None)` when the event carries no settings.
    pub fn settings_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.settings()
            .map(|settings| serde_json::from_value(Value::Object(settings.clone())))
            .transpose()
    }
}
