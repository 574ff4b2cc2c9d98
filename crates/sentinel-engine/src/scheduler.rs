//! Background scheduling service for periodic jobs.

use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use sentinel_common_core::LifecycleError;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::SchedulerConfig;
use crate::subservice::Subservice;

/// A job executed repeatedly at a fixed interval.
pub struct PeriodicJob {
    /// Job name, used in logs.
    pub name: String,
    /// Time between runs.
    pub interval: Duration,
    /// The job body.
    pub run: Box<dyn Fn() + Send + Sync>,
}

impl PeriodicJob {
    /// Create a job from a name, interval and body.
    pub fn new(name: impl Into<String>, interval: Duration, run: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            interval,
            run: Box::new(run),
        }
    }
}

enum Command {
    Enqueue(PeriodicJob),
    Reset,
}

/// Handle for enqueueing periodic work onto the scheduler.
#[derive(Clone)]
pub struct JobSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl JobSender {
    /// Enqueue a job. Returns false when the scheduler has shut down.
    pub fn enqueue(&self, job: PeriodicJob) -> bool {
        self.tx.send(Command::Enqueue(job)).is_ok()
    }
}

/// Runs periodic jobs on a background task.
///
/// Jobs arrive over a command channel so they can be registered before or
/// after the scheduler starts; `reset` drops all registered jobs without
/// restarting the task.
pub struct SchedulingService {
    tick_interval: Duration,
    command_tx: mpsc::UnboundedSender<Command>,
    command_rx: StdMutex<Option<mpsc::UnboundedReceiver<Command>>>,
    shutdown: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulingService {
    /// Create a scheduler from configuration. Nothing runs until `start`.
    pub fn new(config: &SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown, _) = broadcast::channel(1);

        Self {
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            command_tx,
            command_rx: StdMutex::new(Some(command_rx)),
            shutdown,
            handle: Mutex::new(None),
        }
    }

    /// Handle for enqueueing jobs.
    pub fn job_sender(&self) -> JobSender {
        JobSender {
            tx: self.command_tx.clone(),
        }
    }
}

struct ScheduledJob {
    job: PeriodicJob,
    next_due: Instant,
}

async fn run_loop(
    tick_interval: Duration,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut jobs: Vec<ScheduledJob> = Vec::new();
    let mut ticker = tokio::time::interval(tick_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                for scheduled in jobs.iter_mut() {
                    if scheduled.next_due <= now {
                        debug!(job = %scheduled.job.name, "running periodic job");
                        (scheduled.job.run)();
                        scheduled.next_due = now + scheduled.job.interval;
                    }
                }
            }
            command = command_rx.recv() => match command {
                Some(Command::Enqueue(job)) => {
                    debug!(job = %job.name, interval_ms = job.interval.as_millis() as u64, "job registered");
                    let next_due = Instant::now() + job.interval;
                    jobs.push(ScheduledJob { job, next_due });
                }
                Some(Command::Reset) => {
                    info!(dropped = jobs.len(), "scheduler reset");
                    jobs.clear();
                }
                None => break,
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    info!("scheduler loop exited");
}

#[async_trait]
impl Subservice for SchedulingService {
    fn name(&self) -> &'static str {
        "scheduler"
    }

    async fn start(&self) -> Result<(), LifecycleError> {
        let command_rx = self
            .command_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(LifecycleError::Start {
                service: "scheduler",
                reason: "already started".into(),
            })?;

        let shutdown_rx = self.shutdown.subscribe();
        let tick_interval = self.tick_interval;
        let task = tokio::spawn(run_loop(tick_interval, command_rx, shutdown_rx));

        *self.handle.lock().await = Some(task);
        info!("scheduler started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), LifecycleError> {
        let _ = self.shutdown.send(());
        info!("scheduler stop requested");
        Ok(())
    }

    async fn wait(&self) -> Result<(), LifecycleError> {
        let task = self.handle.lock().await.take();
        if let Some(task) = task {
            task.await.map_err(|e| LifecycleError::Wait {
                service: "scheduler",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), LifecycleError> {
        self.command_tx
            .send(Command::Reset)
            .map_err(|_| LifecycleError::Reset {
                service: "scheduler",
                reason: "command channel closed".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig { tick_interval_ms: 5 }
    }

    #[tokio::test]
    async fn runs_registered_jobs_until_stopped() {
        let scheduler = SchedulingService::new(&fast_config());
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        assert!(scheduler.job_sender().enqueue(PeriodicJob::new(
            "tick-counter",
            Duration::from_millis(1),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )));

        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        scheduler.stop().await.unwrap();
        scheduler.wait().await.unwrap();

        assert!(runs.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let scheduler = SchedulingService::new(&fast_config());
        scheduler.start().await.unwrap();

        let err = scheduler.start().await.unwrap_err();
        assert!(matches!(err, LifecycleError::Start { service: "scheduler", .. }));

        scheduler.stop().await.unwrap();
        scheduler.wait().await.unwrap();
    }

    #[tokio::test]
    async fn reset_fails_once_the_loop_has_exited() {
        let scheduler = SchedulingService::new(&fast_config());
        scheduler.start().await.unwrap();
        scheduler.reset().await.unwrap();

        scheduler.stop().await.unwrap();
        scheduler.wait().await.unwrap();

        let err = scheduler.reset().await.unwrap_err();
        assert!(matches!(err, LifecycleError::Reset { service: "scheduler", .. }));
    }
}
