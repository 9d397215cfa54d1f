//! Command-line interface definitions and parsing

use std::ffi::OsString;

use clap::Parser;
use deckplug_core::{normalize_host_args, StartupArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Counter plugin for the Stream Deck", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub startup: StartupArgs,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Engine options file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,
}

impl Cli {
    /// Parse arguments as passed by the Stream Deck application
    pub fn parse_host() -> Self {
        Self::parse_host_from(std::env::args_os())
    }

    pub fn parse_host_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::parse_from(normalize_host_args(args, StartupArgs::HOST_FLAGS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_host_launch_line() {
        let cli = Cli::parse_host_from([
            "deckplug-counter",
            "-port",
            "28196",
            "-pluginUUID",
            "ABCDEF",
            "-registerEvent",
            "registerPlugin",
            "-info",
            "{\"devices\":[]}",
            "-v",
        ]);

        assert_eq!(cli.startup.port, 28196);
        assert_eq!(cli.startup.plugin_uuid, "ABCDEF");
        assert_eq!(cli.startup.register_event, "registerPlugin");
        assert_eq!(cli.startup.info, "{\"devices\":[]}");
        assert!(cli.verbose);
        assert!(!cli.startup.debug);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_engine_flags_mix_with_host_flags() {
        let cli = Cli::parse_host_from([
            "deckplug-counter",
            "--config",
            "engine.toml",
            "-debug",
            "-port",
            "1",
        ]);

        assert_eq!(cli.config.as_deref(), Some("engine.toml"));
        assert!(cli.startup.debug);
        assert_eq!(cli.startup.port, 1);
    }
}
