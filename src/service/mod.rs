//! Long-running service mode.
//!
//! The service loads its configuration once, syncs the template cache and
//! hands a [`ServiceContext`] to a [`RequestHandler`]. It then listens until
//! [`Shutdown`] resolves, waits for the handler and any in-flight pipeline
//! run, and stops:
//!
//! ```text
//! START -> LISTENING -> SHUTTING_DOWN -> STOPPED
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use berth::cache::TemplateCache;
//! use berth::packs::PackDetector;
//! use berth::pipeline::{Pipeline, PipelineConfig};
//! use berth::registry::RegistryClient;
//! use berth::service::{listen_for_signals, Service, Shutdown, TemplateRefresher};
//! use std::time::Duration;
//!
//! let pipeline = Arc::new(Pipeline::new(
//!     TemplateCache::new(RegistryClient::new().unwrap()),
//!     Box::new(PackDetector::new()),
//! ));
//! let handler = Arc::new(TemplateRefresher::new(Duration::from_secs(3600)));
//! let service = Service::new(PipelineConfig::default(), pipeline.clone(), handler);
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let (trigger, shutdown) = Shutdown::new();
//!     listen_for_signals(trigger).unwrap();
//!     service.run(shutdown).await.unwrap();
//! });
//! ```

pub mod context;
pub mod handler;
pub mod shutdown;

pub use context::ServiceContext;
pub use handler::{RequestHandler, TemplateRefresher};
pub use shutdown::{listen_for_signals, Shutdown, ShutdownTrigger};

use anyhow::anyhow;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::{Result, ResultExt};
use crate::pipeline::{Pipeline, PipelineConfig};

/// Lifecycle state of a [`Service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Start,
    Listening,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Listening => "LISTENING",
            Self::ShuttingDown => "SHUTTING_DOWN",
            Self::Stopped => "STOPPED",
        };
        write!(f, "{}", name)
    }
}

/// A service that has not started yet.
pub struct Service {
    defaults: PipelineConfig,
    pipeline: Arc<Pipeline>,
    handler: Arc<dyn RequestHandler>,
}

impl Service {
    /// Create a service whose runs start from `defaults`.
    ///
    /// Build `pipeline` outside the async runtime; its HTTP client blocks.
    pub fn new(
        defaults: PipelineConfig,
        pipeline: Arc<Pipeline>,
        handler: Arc<dyn RequestHandler>,
    ) -> Self {
        Self {
            defaults,
            pipeline,
            handler,
        }
    }

    /// Sync templates and start the handler.
    ///
    /// A failed initial sync is a startup error.
    pub async fn start(self, shutdown: Shutdown) -> Result<RunningService> {
        let mut state = ServiceState::Start;
        tracing::debug!("Service {}", state);

        let context = ServiceContext::new(self.pipeline, self.defaults, shutdown.clone());

        if let Some(outcome) = context
            .sync_templates()
            .await
            .wrap_err(|| "Failed to download latest templates")?
        {
            tracing::info!("Templates ready (version {})", outcome.version());
        }

        let handler = Arc::clone(&self.handler);
        let task = tokio::spawn({
            let context = context.clone();
            let shutdown = shutdown.clone();
            async move { handler.serve(context, shutdown).await }
        });

        transition(&mut state, ServiceState::Listening);
        tracing::info!("Listening with the {} handler", self.handler.name());

        Ok(RunningService {
            state,
            context,
            shutdown,
            task,
        })
    }

    /// Start, then run until shutdown.
    pub async fn run(self, shutdown: Shutdown) -> Result<()> {
        self.start(shutdown).await?.wait().await
    }
}

/// A listening service.
pub struct RunningService {
    state: ServiceState,
    context: ServiceContext,
    shutdown: Shutdown,
    task: JoinHandle<Result<()>>,
}

impl RunningService {
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// The context shared with the handler.
    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    /// Block until shutdown, then wait for the handler and in-flight runs.
    ///
    /// A handler error is returned once the service has stopped.
    pub async fn wait(mut self) -> Result<()> {
        let mut handler_done = None;
        tokio::select! {
            _ = self.shutdown.wait() => {}
            joined = &mut self.task => handler_done = Some(joined),
        }

        if let Some(Ok(Ok(()))) = &handler_done {
            tracing::debug!("Handler finished early, waiting for shutdown");
            self.shutdown.wait().await;
        }

        transition(&mut self.state, ServiceState::ShuttingDown);

        let joined = match handler_done {
            Some(joined) => joined,
            None => (&mut self.task).await,
        };
        self.context.drain().await;

        transition(&mut self.state, ServiceState::Stopped);

        match joined {
            Ok(result) => result.wrap_err(|| "Request handler failed"),
            Err(e) => Err(anyhow!("request handler panicked: {}", e).into()),
        }
    }
}

fn transition(state: &mut ServiceState, next: ServiceState) {
    tracing::debug!("Service {} -> {}", state, next);
    *state = next;
}
