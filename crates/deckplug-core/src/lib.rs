//! deckplug core
//!
//! Foundational types for Stream Deck plugins: the event vocabulary, inbound and
//! outbound wire types, the registration info document, startup configuration,
//! queue utilities and the error taxonomy. The connection engine lives in
//! `deckplug-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod channel;
pub mod config;
pub mod errors;
pub mod events;
pub mod inbound;
pub mod info;
pub mod outbound;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use channel::{
    create_inbound_channel, create_outbound_channel, ChannelError, InboundReceiver,
    InboundSender, NonBlockingSend, OutboundReceiver, OutboundSender,
};
pub use config::{normalize_host_args, ChannelConfig, EngineOptions, PluginConfig, StartupArgs};
pub use errors::{
    ConfigurationError, DeckError, DeckResult, DecodeError, EncodeError, HandlerError,
    TransportError,
};
pub use events::{Direction, EventName};
pub use inbound::{
    ActionPayload, ApplicationPayload, Coordinates, DeviceInfo, DeviceSize, DeviceType,
    GlobalSettingsPayload, InboundEvent, InboundPayload, Settings, SettingsPayload,
    TitleParameters, TitleParametersPayload,
};
pub use info::RegistrationInfo;
pub use outbound::{ImagePayload, OutboundEvent, OutboundPayload, Target, TitlePayload};
