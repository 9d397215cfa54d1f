//! Error handling for the deckplug demo binary

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Plugin error: {0}")]
    Deck(#[from] deckplug_core::DeckError),

    #[error("Configuration error: {0}")]
    Config(#[from] deckplug_core::ConfigurationError),

    #[error("Plugin stopped: {0}")]
    Stopped(String),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
