//! Plugin entry point
//!
//! [`Plugin`] owns a registered connection and its handler list. Registration
//! happens at construction; [`Plugin::spawn`] starts the Reader, Writer and
//! Dispatcher and hands back a [`PluginHandle`] to observe or stop them.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use deckplug_core::{
    create_inbound_channel, create_outbound_channel, DeckResult, EngineOptions, OutboundEvent,
    OutboundReceiver, PluginConfig, RegistrationInfo, StartupArgs,
};

use crate::client::Client;
use crate::handler::{Handler, HandlerRegistry};
use crate::lifecycle::Lifecycle;
use crate::tasks::{DispatcherTask, HostLog, LoopExit, ReaderTask, WriterTask};
use crate::transport::{TransportReader, TransportWriter};
use crate::websocket;

/// A registered plugin connection, ready to run
pub struct Plugin {
    config: PluginConfig,
    options: EngineOptions,
    reader: Box<dyn TransportReader>,
    writer: Box<dyn TransportWriter>,
    registry: HandlerRegistry,
    client: Client,
    outbound: OutboundReceiver,
}

impl Plugin {
    /// Validate startup arguments, then connect and register
    pub async fn from_args(args: &StartupArgs, options: EngineOptions) -> DeckResult<Self> {
        let config = PluginConfig::from_args(args)?;
        Self::connect(config, options).await
    }

    /// Dial the host's WebSocket server and register
    pub async fn connect(config: PluginConfig, options: EngineOptions) -> DeckResult<Self> {
        options.validate()?;

        let url = config.websocket_url();
        info!(%url, uuid = %config.plugin_uuid, "Connecting to Stream Deck");
        let (reader, writer) = websocket::connect(&url).await?;

        Self::handshake(config, options, Box::new(reader), Box::new(writer)).await
    }

    /// Register over an already established connection
    ///
    /// The registration message is the first thing written; no other traffic
    /// can precede it because the Writer does not exist yet.
    pub async fn handshake(
        config: PluginConfig,
        options: EngineOptions,
        reader: Box<dyn TransportReader>,
        mut writer: Box<dyn TransportWriter>,
    ) -> DeckResult<Self> {
        options.validate()?;

        let registration =
            OutboundEvent::registration(&config.register_event, &config.plugin_uuid);
        writer.write_message(registration.encode()?).await?;
        info!(
            event = %config.register_event,
            uuid = %config.plugin_uuid,
            "Plugin registered"
        );

        let (sender, outbound) = create_outbound_channel(&options.channels);
        let client = Client::new(sender, &config.plugin_uuid);

        Ok(Self {
            config,
            options,
            reader,
            writer,
            registry: HandlerRegistry::new(),
            client,
            outbound,
        })
    }

    /// Connection identity this plugin registered with
    pub fn uuid(&self) -> &str {
        &self.config.plugin_uuid
    }

    /// Registration info supplied by the host at launch
    pub fn info(&self) -> &RegistrationInfo {
        &self.config.info
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Handle for enqueuing outbound commands
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Add a handler; every handler sees every inbound event
    pub fn register<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.registry.register(handler);
        self
    }

    pub fn register_shared(&mut self, handler: Arc<dyn Handler>) -> &mut Self {
        self.registry.register_shared(handler);
        self
    }

    /// Start the Reader, Writer and Dispatcher
    pub fn spawn(self, lifecycle: Lifecycle) -> PluginHandle {
        if self.registry.is_empty() {
            warn!("Starting plugin without handlers; inbound events will be ignored");
        }

        let token = lifecycle.token();
        let (inbound_tx, inbound_rx) = create_inbound_channel(&self.options.channels);
        let host_log = HostLog::new(self.client.sender(), self.options.debug);

        let reader = ReaderTask::new(self.reader, inbound_tx, token.clone(), host_log.clone());
        let writer = WriterTask::new(self.writer, self.outbound, token.clone());
        let dispatcher = DispatcherTask::new(
            inbound_rx,
            self.registry.freeze(),
            self.client.clone(),
            token,
            self.options.max_in_flight_handlers,
            host_log,
        );

        PluginHandle {
            reader: tokio::spawn(reader.run()),
            writer: tokio::spawn(writer.run()),
            dispatcher: tokio::spawn(dispatcher.run()),
            client: self.client,
            lifecycle,
        }
    }

    /// Run until the connection ends or `lifecycle` is shut down
    pub async fn run(self, lifecycle: Lifecycle) -> LoopExit {
        self.spawn(lifecycle).wait().await
    }

    /// Run until the connection ends or the process is asked to stop
    pub async fn run_until_signal(self) -> LoopExit {
        let lifecycle = Lifecycle::new();
        let _watcher = lifecycle.shutdown_on_signals();
        self.run(lifecycle).await
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Running Plugin
// ----------------------------------------------------------------------------

/// Exit reasons of all three loops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub reader: LoopExit,
    pub writer: LoopExit,
    pub dispatcher: LoopExit,
}

/// Handle to a running plugin
#[derive(Debug)]
pub struct PluginHandle {
    reader: JoinHandle<LoopExit>,
    writer: JoinHandle<LoopExit>,
    dispatcher: JoinHandle<LoopExit>,
    client: Client,
    lifecycle: Lifecycle,
}

impl PluginHandle {
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Ask every loop to stop; returns immediately
    pub fn shutdown(&self) {
        self.lifecycle.shutdown();
    }

    /// Wait for the dispatcher, then stop the remaining loops
    ///
    /// A reader failure is what ended the dispatcher in that case, so it is
    /// reported instead of the dispatcher's clean exit. The writer is not
    /// awaited: a write stuck on the network must not keep the process alive.
    pub async fn wait(self) -> LoopExit {
        let exit = join_loop(self.dispatcher).await;
        debug!(?exit, "Dispatcher finished, shutting down");
        self.lifecycle.shutdown();

        match join_loop(self.reader).await {
            failed @ (LoopExit::Failed(_) | LoopExit::Aborted(_)) => {
                warn!(exit = ?failed, "Reader stopped abnormally");
                failed
            }
            _ => exit,
        }
    }

    /// Wait for all three loops to stop
    pub async fn join(self) -> RunReport {
        let dispatcher = join_loop(self.dispatcher).await;
        self.lifecycle.shutdown();
        let reader = join_loop(self.reader).await;
        let writer = join_loop(self.writer).await;
        RunReport {
            reader,
            writer,
            dispatcher,
        }
    }
}

async fn join_loop(handle: JoinHandle<LoopExit>) -> LoopExit {
    match handle.await {
        Ok(exit) => exit,
        Err(e) => LoopExit::Aborted(e.to_string()),
    }
}
