//! Engine service lifecycle.

use std::sync::Arc;

use sentinel_common_core::LifecycleError;
use sentinel_common_log::TraceMetadata;
use sentinel_profiling::{LoggingBackend, ProcessIdentity, Profiler, ProfilerBackend};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::continuous::ContinuousAuditHandler;
use crate::host::{DefaultHost, ServiceHost};
use crate::scheduler::SchedulingService;
use crate::subservice::Subservice;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
    Resetting,
}

impl LifecycleState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Resetting => "resetting",
        }
    }
}

/// The decision-engine worker process.
///
/// Owns the base service surface plus three subservices: the profiler
/// initializer (start-only), the background scheduler and the continuous
/// audit handler. Subservices are constructed eagerly with the service and
/// owned exclusively by it.
///
/// Lifecycle transitions must be invoked sequentially from a single
/// controlling task; overlapping transitions are not supported.
pub struct EngineService {
    service_name: String,
    profiler_enabled: bool,
    host: Box<dyn ServiceHost>,
    backend: Arc<dyn ProfilerBackend>,
    scheduler: Box<dyn Subservice>,
    continuous: Box<dyn Subservice>,
    state: LifecycleState,
}

impl EngineService {
    /// Build the engine with production subservices.
    pub fn new(config: EngineConfig) -> Self {
        let profiler = Arc::new(Profiler::new(config.profiler.clone()));
        let scheduler = SchedulingService::new(&config.scheduler);
        let continuous = ContinuousAuditHandler::new(
            &config.continuous,
            Arc::clone(&profiler),
            scheduler.job_sender(),
        );

        Self::with_parts(
            config,
            Box::new(DefaultHost),
            Arc::new(LoggingBackend),
            Box::new(scheduler),
            Box::new(continuous),
        )
    }

    /// Build the engine over explicit collaborators.
    pub fn with_parts(
        config: EngineConfig,
        host: Box<dyn ServiceHost>,
        backend: Arc<dyn ProfilerBackend>,
        scheduler: Box<dyn Subservice>,
        continuous: Box<dyn Subservice>,
    ) -> Self {
        Self {
            service_name: config.service_name,
            profiler_enabled: config.profiler.enabled,
            host,
            backend,
            scheduler,
            continuous,
            state: LifecycleState::Created,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Start the engine.
    ///
    /// Order: base services, profiler backend registration (non-fatal),
    /// scheduler, then continuous handler — the scheduler must be running
    /// before continuous audits can enqueue periodic work.
    pub async fn start(&mut self) -> Result<(), LifecycleError> {
        if !matches!(self.state, LifecycleState::Created | LifecycleState::Stopped) {
            return Err(LifecycleError::InvalidTransition {
                transition: "start",
                state: self.state.as_str(),
            });
        }
        self.state = LifecycleState::Starting;

        self.host.start().await?;
        if self.profiler_enabled {
            self.init_profiler_backend();
        }
        self.scheduler.start().await?;
        self.continuous.start().await?;

        self.state = LifecycleState::Running;
        info!(service = %self.service_name, "engine service started");
        Ok(())
    }

    /// Register with the profiler backend. Failure leaves profiling
    /// disabled and never aborts startup.
    fn init_profiler_backend(&self) {
        let identity = match ProcessIdentity::local(&self.service_name, admin_context()) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "failed to initialize profiler; profiling will be disabled");
                return;
            }
        };
        match self.backend.init(&identity) {
            Ok(()) => info!(service = %self.service_name, "profiler initialized"),
            Err(e) => {
                warn!(error = %e, "failed to initialize profiler; profiling will be disabled");
            }
        }
    }

    /// Stop the engine.
    ///
    /// Subservices stop in reverse start order. The original service this
    /// derives from stopped only the scheduler; the symmetric stop of the
    /// continuous handler is a deliberate deviation.
    pub async fn stop(&mut self) -> Result<(), LifecycleError> {
        if !matches!(self.state, LifecycleState::Running | LifecycleState::Starting) {
            return Err(LifecycleError::InvalidTransition {
                transition: "stop",
                state: self.state.as_str(),
            });
        }
        self.state = LifecycleState::Stopping;

        self.host.stop().await?;
        self.continuous.stop().await?;
        self.scheduler.stop().await?;

        self.state = LifecycleState::Stopped;
        info!(service = %self.service_name, "engine service stopped");
        Ok(())
    }

    /// Block until background work has finished. Graceful-shutdown join
    /// point: call after `stop`.
    pub async fn wait(&mut self) -> Result<(), LifecycleError> {
        self.host.wait().await?;
        self.scheduler.wait().await?;
        Ok(())
    }

    /// Reinitialize scheduling state without a stop/start cycle, e.g. after
    /// a configuration reload.
    pub async fn reset(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Running {
            return Err(LifecycleError::InvalidTransition {
                transition: "reset",
                state: self.state.as_str(),
            });
        }
        self.state = LifecycleState::Resetting;

        let result = async {
            self.host.reset().await?;
            self.scheduler.reset().await
        }
        .await;

        self.state = LifecycleState::Running;
        result
    }
}

/// Admin-privilege context attached to the profiler registration.
fn admin_context() -> TraceMetadata {
    let mut context = TraceMetadata::new();
    context.insert("user".into(), serde_json::Value::String("sentinel".into()));
    context.insert("is_admin".into(), serde_json::Value::Bool(true));
    context
}
