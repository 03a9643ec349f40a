//! Request handlers run by the service.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use crate::error::Result;

use super::context::ServiceContext;
use super::shutdown::Shutdown;

/// Work the service runs while listening.
///
/// `serve` must return once `shutdown` resolves. Pipeline runs go through
/// the [`ServiceContext`] so they are serialized and drained on shutdown.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Handle requests until shutdown.
    async fn serve(&self, ctx: ServiceContext, shutdown: Shutdown) -> Result<()>;
}

/// Keeps the template cache fresh by syncing it on a fixed interval.
#[derive(Debug, Clone)]
pub struct TemplateRefresher {
    interval: Duration,
}

impl TemplateRefresher {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl RequestHandler for TemplateRefresher {
    fn name(&self) -> &str {
        "template-refresher"
    }

    async fn serve(&self, ctx: ServiceContext, shutdown: Shutdown) -> Result<()> {
        if let Some(dir) = &ctx.defaults().template_source {
            tracing::info!(
                "Using templates from {}, automatic refresh disabled",
                dir.display()
            );
            shutdown.wait().await;
            return Ok(());
        }

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and the cache was synced at startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = ticker.tick() => {
                    match ctx.sync_templates().await {
                        Ok(Some(outcome)) => {
                            tracing::debug!("Templates refreshed (version {})", outcome.version());
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Template refresh failed: {}", e),
                    }
                }
            }
        }

        Ok(())
    }
}
