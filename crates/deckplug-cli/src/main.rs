//! deckplug counter - Stream Deck plugin entry point

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use deckplug_cli::{Cli, CliError, CounterHandler, Result};
use deckplug_core::{EngineOptions, PluginConfig};
use deckplug_runtime::{LoopExit, Plugin};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments in the host's single-dash form
    let cli = Cli::parse_host();

    // Initialize logging
    setup_logging(cli.verbose || cli.startup.debug);

    // Validate startup inputs before touching the network
    let config = PluginConfig::from_args(&cli.startup)?;
    let options = load_configuration(&cli)?;

    let mut plugin = match Plugin::connect(config, options).await {
        Ok(plugin) => plugin,
        Err(e) => {
            error!("Failed to register with Stream Deck: {}", e);
            return Err(e.into());
        }
    };

    let counter = CounterHandler::new(plugin.client());
    plugin.register(counter);

    match plugin.run_until_signal().await {
        LoopExit::Cancelled | LoopExit::Closed => {
            info!("Plugin exited successfully");
            Ok(())
        }
        LoopExit::Failed(e) => Err(CliError::Stopped(e.to_string())),
        LoopExit::Aborted(reason) => Err(CliError::Stopped(reason)),
    }
}

/// Setup logging; `RUST_LOG` overrides the verbosity flag
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();
}

/// Load engine options from file or use defaults
fn load_configuration(cli: &Cli) -> Result<EngineOptions> {
    let options = match &cli.config {
        Some(path) => EngineOptions::load_from_file(path)?,
        None => {
            info!("Using default engine options");
            EngineOptions::default()
        }
    };
    let debug = options.debug || cli.startup.debug;
    Ok(options.with_debug(debug))
}
