//! Continuous audit handler.
//!
//! Launches audits on a fixed cadence. Audit launches are instrumented with
//! the trace-with-memory composition; the scheduler must already be running
//! when this handler starts, because it enqueues periodic interval-sync work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sentinel_common_core::LifecycleError;
use sentinel_common_log::TraceMetadata;
use sentinel_profiling::{InstrumentedOperation, Profiler};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ContinuousConfig;
use crate::scheduler::{JobSender, PeriodicJob};
use crate::subservice::Subservice;

/// One audit to launch.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    /// Audit identifier, used as the trace correlation id.
    pub uuid: String,
}

impl AuditRequest {
    fn next() -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
        }
    }
}

/// Dispatches continuous audits and keeps their intervals synchronized.
pub struct ContinuousAuditHandler {
    audit_interval: Duration,
    profiler: Arc<Profiler>,
    operation: Arc<InstrumentedOperation<AuditRequest>>,
    jobs: JobSender,
    launched: Arc<AtomicU64>,
    shutdown: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

fn audit_metadata(request: &AuditRequest) -> Result<TraceMetadata, sentinel_common_core::MetadataError> {
    let mut metadata = TraceMetadata::new();
    metadata.insert(
        "audit_id".into(),
        serde_json::Value::String(request.uuid.clone()),
    );
    Ok(metadata)
}

impl ContinuousAuditHandler {
    /// Create a handler. Nothing runs until `start`.
    pub fn new(config: &ContinuousConfig, profiler: Arc<Profiler>, jobs: JobSender) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        let operation = Arc::new(
            InstrumentedOperation::new("audit-execute").with_metadata(audit_metadata),
        );

        Self {
            audit_interval: Duration::from_millis(config.audit_interval_ms),
            profiler,
            operation,
            jobs,
            launched: Arc::new(AtomicU64::new(0)),
            shutdown,
            handle: Mutex::new(None),
        }
    }

    /// Launch one audit under instrumentation and return its id.
    pub fn execute(&self, request: AuditRequest) -> String {
        launch_audit(&self.operation, &self.profiler, &self.launched, request)
    }

    /// Number of audits launched since start.
    pub fn launched(&self) -> u64 {
        self.launched.load(Ordering::SeqCst)
    }
}

fn launch_audit(
    operation: &InstrumentedOperation<AuditRequest>,
    profiler: &Profiler,
    launched: &AtomicU64,
    request: AuditRequest,
) -> String {
    operation.invoke(profiler, request, |request| {
        info!(audit_id = %request.uuid, "launching continuous audit");
        launched.fetch_add(1, Ordering::SeqCst);
        request.uuid
    })
}

#[async_trait]
impl Subservice for ContinuousAuditHandler {
    fn name(&self) -> &'static str {
        "continuous-audit-handler"
    }

    async fn start(&self) -> Result<(), LifecycleError> {
        // Interval changes are picked up by periodic work on the scheduler,
        // which therefore has to be running first.
        let registered = self.jobs.enqueue(PeriodicJob::new(
            "continuous-audit-interval-sync",
            self.audit_interval,
            || debug!("synchronizing continuous audit intervals"),
        ));
        if !registered {
            return Err(LifecycleError::Start {
                service: "continuous-audit-handler",
                reason: "scheduler is not accepting jobs".into(),
            });
        }

        let audit_interval = self.audit_interval;
        let operation = Arc::clone(&self.operation);
        let profiler = Arc::clone(&self.profiler);
        let launched = Arc::clone(&self.launched);
        let mut shutdown_rx = self.shutdown.subscribe();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(audit_interval);
            // The immediate first tick would launch an audit at startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        launch_audit(&operation, &profiler, &launched, AuditRequest::next());
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }

            info!("continuous audit loop exited");
        });

        *self.handle.lock().await = Some(task);
        info!("continuous audit handler started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), LifecycleError> {
        let _ = self.shutdown.send(());
        info!("continuous audit handler stop requested");
        Ok(())
    }

    async fn wait(&self) -> Result<(), LifecycleError> {
        let task = self.handle.lock().await.take();
        if let Some(task) = task {
            task.await.map_err(|e| LifecycleError::Wait {
                service: "continuous-audit-handler",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
