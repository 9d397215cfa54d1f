//! Lifecycle signal
//!
//! One cancellation token shared by the Reader, Writer and Dispatcher. Once
//! cancelled, every loop stops at its next checkpoint and never resumes.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    token: CancellationToken,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token observed by the engine loops
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Ask every loop to stop
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until shutdown has been requested
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }

    /// Request shutdown when the process receives an interrupt or terminate signal
    pub fn shutdown_on_signals(&self) -> JoinHandle<()> {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                signal = wait_for_signal() => {
                    info!(signal, "Received shutdown signal");
                    token.cancel();
                }
            }
        })
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        name = wait_for_ctrl_c() => name,
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    "SIGINT"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_is_shared_and_sticky() {
        let lifecycle = Lifecycle::new();
        let observer = lifecycle.clone();
        let token = lifecycle.token();
        assert!(!observer.is_shutdown());

        lifecycle.shutdown();
        assert!(observer.is_shutdown());
        assert!(token.is_cancelled());

        tokio::time::timeout(Duration::from_secs(1), observer.stopped())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_signal_watcher_exits_on_shutdown() {
        let lifecycle = Lifecycle::new();
        let watcher = lifecycle.shutdown_on_signals();
        lifecycle.shutdown();

        tokio::time::timeout(Duration::from_secs(1), watcher)
            .await
            .unwrap()
            .unwrap();
    }
}
