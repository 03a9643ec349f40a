//! Cooperative shutdown signalling.
//!
//! A [`ShutdownTrigger`] fires once; every [`Shutdown`] clone observes it.
//! Tasks check [`Shutdown::is_triggered`] before starting new work and
//! `select!` on [`Shutdown::wait`] while idle.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;

/// Receiving side of the shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Sending side of the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a connected trigger and receiver.
    pub fn new() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx: Arc::new(tx) }, Shutdown { rx })
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested.
    ///
    /// Also resolves when every trigger has been dropped, since nothing can
    /// request shutdown any more.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl ShutdownTrigger {
    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("Shutdown requested");
        }
    }
}

/// Fire `trigger` when the process is interrupted.
///
/// Handlers are installed before this returns, so a signal delivered right
/// after the call is not lost. Must be called from within a tokio runtime.
#[cfg(unix)]
pub fn listen_for_signals(trigger: ShutdownTrigger) -> Result<JoinHandle<()>> {
    use anyhow::Context;
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).context("Failed to install the SIGINT handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install the SIGTERM handler")?;

    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => tracing::info!("Received SIGINT, shutting down"),
            _ = terminate.recv() => tracing::info!("Received SIGTERM, shutting down"),
        }
        trigger.trigger();
    }))
}

/// Fire `trigger` when the process is interrupted.
#[cfg(not(unix))]
pub fn listen_for_signals(trigger: ShutdownTrigger) -> Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl-C, shutting down");
                trigger.trigger();
            }
            Err(e) => tracing::warn!("Could not listen for Ctrl-C: {}", e),
        }
    }))
}
