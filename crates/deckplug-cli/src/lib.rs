//! deckplug demo plugin
//!
//! A counter action built on `deckplug-runtime`: argument parsing, logging
//! setup and the handler itself.

pub mod cli;
pub mod counter;
pub mod error;

pub use cli::Cli;
pub use counter::{CounterHandler, CounterSettings};
pub use error::{CliError, Result};
