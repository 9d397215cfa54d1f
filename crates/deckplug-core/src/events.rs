//! Event vocabulary
//!
//! The closed set of event names exchanged with the Stream Deck application.
//! Each name maps to the exact string used on the wire and knows in which
//! direction it travels.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DecodeError;

// ----------------------------------------------------------------------------
// Direction
// ----------------------------------------------------------------------------

/// Which side of the connection emits an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Sent by the host, received by the plugin
    Inbound,
    /// Sent by the plugin to the host
    Outbound,
}

// ----------------------------------------------------------------------------
// Event Name
// ----------------------------------------------------------------------------

macro_rules! event_names {
    ($( $(#[$doc:meta])* $variant:ident => $wire:literal, $dir:ident; )*) => {
        /// Name of an event exchanged with the Stream Deck application
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventName {
            $( $(#[$doc])* $variant, )*
        }

        impl EventName {
            /// Every known event name
            pub const ALL: &'static [EventName] = &[$( EventName::$variant, )*];

            /// The string used on the wire
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( EventName::$variant => $wire, )*
                }
            }

            /// Direction this event travels in
            pub fn direction(&self) -> Direction {
                match self {
                    $( EventName::$variant => Direction::$dir, )*
                }
            }
        }

        impl FromStr for EventName {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(EventName::$variant), )*
                    other => Err(DecodeError::UnknownEvent(other.to_string())),
                }
            }
        }
    };
}

event_names! {
    /// Received after calling `getSettings`, carries the action's persistent data
    DidReceiveSettings => "didReceiveSettings", Inbound;
    /// Received after calling `getGlobalSettings`
    DidReceiveGlobalSettings => "didReceiveGlobalSettings", Inbound;
    /// The user pressed a key
    KeyDown => "keyDown", Inbound;
    /// The user released a key
    KeyUp => "keyUp", Inbound;
    /// An action instance became visible on the device
    WillAppear => "willAppear", Inbound;
    /// An action instance stopped being displayed
    WillDisappear => "willDisappear", Inbound;
    /// The user changed the title or title parameters
    TitleParametersDidChange => "titleParametersDidChange", Inbound;
    /// A device was plugged in
    DeviceDidConnect => "deviceDidConnect", Inbound;
    /// A device was unplugged
    DeviceDidDisconnect => "deviceDidDisconnect", Inbound;
    /// A monitored application was launched
    ApplicationDidLaunch => "applicationDidLaunch", Inbound;
    /// A monitored application was terminated
    ApplicationDidTerminate => "applicationDidTerminate", Inbound;
    /// The computer woke up
    SystemDidWakeUp => "systemDidWakeUp", Inbound;
    /// The Property Inspector appeared in the Stream Deck software
    PropertyInspectorDidAppear => "propertyInspectorDidAppear", Inbound;
    /// The Property Inspector was removed from the Stream Deck software
    PropertyInspectorDidDisappear => "propertyInspectorDidDisappear", Inbound;
    /// Payload sent by the Property Inspector to the plugin
    SendToPlugin => "sendToPlugin", Inbound;

    /// Save data persistently for an action instance
    SetSettings => "setSettings", Outbound;
    /// Request the persistent data of an action instance
    GetSettings => "getSettings", Outbound;
    /// Save data securely and globally for the plugin
    SetGlobalSettings => "setGlobalSettings", Outbound;
    /// Request the global persistent data
    GetGlobalSettings => "getGlobalSettings", Outbound;
    /// Open a URL in the default browser
    OpenUrl => "openUrl", Outbound;
    /// Write a line to the Stream Deck log file
    LogMessage => "logMessage", Outbound;
    /// Change the title of an action instance
    SetTitle => "setTitle", Outbound;
    /// Change the image of an action instance
    SetImage => "setImage", Outbound;
    /// Update the feedback layout values of a dial action
    SetFeedback => "setFeedback", Outbound;
    /// Temporarily show an alert icon on an action instance
    ShowAlert => "showAlert", Outbound;
    /// Temporarily show an OK checkmark on an action instance
    ShowOk => "showOk", Outbound;
    /// Change the state of a multi-state action instance
    SetState => "setState", Outbound;
    /// Switch to one of the preconfigured read-only profiles
    SwitchToProfile => "switchToProfile", Outbound;
    /// Send a payload to the Property Inspector
    SendToPropertyInspector => "sendToPropertyInspector", Outbound;
}

impl EventName {
    /// Whether the host sends this event to the plugin
    pub fn is_inbound(&self) -> bool {
        self.direction() == Direction::Inbound
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventName> for String {
    fn from(name: EventName) -> Self {
        name.as_str().to_string()
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
