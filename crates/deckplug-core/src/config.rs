//! Plugin configuration
//!
//! Startup inputs arrive as command-line flags set by the Stream Deck
//! application. They are parsed into [`StartupArgs`], validated into a
//! [`PluginConfig`] and passed explicitly into the runtime; nothing is kept in
//! process-wide state. Engine tuning lives in [`EngineOptions`], which can be
//! loaded from a TOML file.

use std::ffi::OsString;
use std::path::Path;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConfigurationError;
use crate::info::RegistrationInfo;

// ----------------------------------------------------------------------------
// Startup Arguments
// ----------------------------------------------------------------------------

/// Flags passed by the Stream Deck application when it launches a plugin
///
/// Every value defaults to empty so that missing inputs surface as
/// [`ConfigurationError`]s from [`PluginConfig::from_args`] rather than as
/// argument parser errors.
#[derive(Debug, Clone, Default, Parser)]
#[command(author, version, about, long_about = None)]
pub struct StartupArgs {
    /// The port that should be used to create the WebSocket
    #[arg(long, default_value_t = 0)]
    pub port: u16,

    /// Unique identifier used to register the plugin once the WebSocket is opened
    #[arg(long = "pluginUUID", default_value = "")]
    pub plugin_uuid: String,

    /// Event type used to register the plugin once the WebSocket is opened
    #[arg(long = "registerEvent", default_value = "")]
    pub register_event: String,

    /// Stringified JSON with the Stream Deck application and devices information
    #[arg(long, default_value = "")]
    pub info: String,

    /// Forward runtime diagnostics to the Stream Deck log
    #[arg(long)]
    pub debug: bool,
}

impl StartupArgs {
    /// Flags the host passes with a single leading dash
    pub const HOST_FLAGS: &'static [&'static str] =
        &["port", "pluginUUID", "registerEvent", "info", "debug"];

    /// Parse the process arguments, accepting the host's `-flag value` form
    pub fn parse_host_args() -> Self {
        Self::parse_from(normalize_host_args(std::env::args_os(), Self::HOST_FLAGS))
    }
}

/// Rewrite single-dash long flags (`-port 1234`) into the `--port 1234` form
///
/// Only names listed in `long_names` are rewritten, so values that happen to
/// start with a dash and short flags are left untouched. The `-name=value`
/// form is handled as well.
pub fn normalize_host_args<I, T>(args: I, long_names: &[&str]) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if long_names.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

// ----------------------------------------------------------------------------
// Plugin Configuration
// ----------------------------------------------------------------------------

/// Validated startup inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Port of the host's WebSocket server on localhost
    pub port: u16,
    /// Connection identity used to register this plugin instance
    pub plugin_uuid: String,
    /// Event name of the registration message
    pub register_event: String,
    /// Parsed `-info` document
    pub info: RegistrationInfo,
}

impl PluginConfig {
    /// Validate raw startup inputs
    ///
    /// Inputs are checked in order (port, uuid, register event, info) and the
    /// first missing one is reported.
    pub fn new(
        port: u16,
        plugin_uuid: &str,
        register_event: &str,
        info: &str,
    ) -> Result<Self, ConfigurationError> {
        if port == 0 {
            return Err(ConfigurationError::MissingPort);
        }
        if plugin_uuid.is_empty() {
            return Err(ConfigurationError::MissingPluginUuid);
        }
        if register_event.is_empty() {
            return Err(ConfigurationError::MissingRegisterEvent);
        }
        let info = RegistrationInfo::parse(info)?;

        Ok(Self {
            port,
            plugin_uuid: plugin_uuid.to_string(),
            register_event: register_event.to_string(),
            info,
        })
    }

    /// Validate parsed startup arguments
    pub fn from_args(args: &StartupArgs) -> Result<Self, ConfigurationError> {
        Self::new(args.port, &args.plugin_uuid, &args.register_event, &args.info)
    }

    /// Address of the host's WebSocket server
    pub fn websocket_url(&self) -> String {
        format!("ws://localhost:{}", self.port)
    }
}

// ----------------------------------------------------------------------------
// Engine Options
// ----------------------------------------------------------------------------

/// Capacities of the inbound and outbound queues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Buffer size of the inbound queue (Reader → Dispatcher)
    pub inbound_buffer_size: usize,
    /// Buffer size of the outbound queue (Client → Writer)
    pub outbound_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            inbound_buffer_size: 128, // Key presses can be bursty
            outbound_buffer_size: 64, // Commands are written quickly
        }
    }
}

impl ChannelConfig {
    /// Create configuration optimized for testing
    pub fn testing() -> Self {
        Self {
            inbound_buffer_size: 100,
            outbound_buffer_size: 100,
        }
    }
}

/// Tuning knobs of the dispatch engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub channels: ChannelConfig,
    /// Upper bound on concurrently running handler invocations; unbounded when `None`
    pub max_in_flight_handlers: Option<usize>,
    /// Also forward runtime diagnostics to the Stream Deck log as `logMessage`
    pub debug: bool,
}

impl EngineOptions {
    /// Create configuration optimized for testing
    pub fn testing() -> Self {
        Self {
            channels: ChannelConfig::testing(),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_in_flight_handlers(mut self, limit: usize) -> Self {
        self.max_in_flight_handlers = Some(limit);
        self
    }

    /// Validate option values
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.channels.inbound_buffer_size == 0 {
            return Err(ConfigurationError::InvalidOptions {
                reason: "inbound buffer size cannot be zero".to_string(),
            });
        }
        if self.channels.outbound_buffer_size == 0 {
            return Err(ConfigurationError::InvalidOptions {
                reason: "outbound buffer size cannot be zero".to_string(),
            });
        }
        if self.max_in_flight_handlers == Some(0) {
            return Err(ConfigurationError::InvalidOptions {
                reason: "max in-flight handlers cannot be zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parse options from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigurationError> {
        let options: EngineOptions =
            toml::from_str(text).map_err(|e| ConfigurationError::InvalidOptions {
                reason: e.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        info!("Loading engine options from: {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|e| ConfigurationError::ConfigFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text)
    }
}
