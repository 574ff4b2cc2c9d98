//! The subservice lifecycle protocol.

use async_trait::async_trait;
use sentinel_common_core::LifecycleError;

/// An independently startable unit owned by the engine process.
///
/// `wait` and `reset` default to no-ops; only the scheduler carries real
/// state for them.
#[async_trait]
pub trait Subservice: Send + Sync {
    /// Name used in logs and lifecycle errors.
    fn name(&self) -> &'static str;

    /// Bring the subservice up. Failures are fatal to process startup.
    async fn start(&self) -> Result<(), LifecycleError>;

    /// Bring the subservice down.
    async fn stop(&self) -> Result<(), LifecycleError>;

    /// Block until the subservice's background work has finished.
    async fn wait(&self) -> Result<(), LifecycleError> {
        Ok(())
    }

    /// Reinitialize internal state without a stop/start cycle.
    async fn reset(&self) -> Result<(), LifecycleError> {
        Ok(())
    }
}
