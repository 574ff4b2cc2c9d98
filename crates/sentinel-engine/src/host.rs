//! Base service surface.
//!
//! The RPC server, notification listener and heartbeat live behind this
//! seam; the engine only depends on their lifecycle protocol. Failures here
//! propagate: the process must not continue in an inconsistent state.

use async_trait::async_trait;
use sentinel_common_core::LifecycleError;
use tracing::info;

/// Lifecycle surface of the base service stack.
#[async_trait]
pub trait ServiceHost: Send + Sync {
    /// Start the base services.
    async fn start(&self) -> Result<(), LifecycleError>;
    /// Stop the base services.
    async fn stop(&self) -> Result<(), LifecycleError>;
    /// Wait for the base services to finish.
    async fn wait(&self) -> Result<(), LifecycleError>;
    /// Reset base service state.
    async fn reset(&self) -> Result<(), LifecycleError>;
}

/// Host used when no external base-service stack is wired in.
#[derive(Debug, Default)]
pub struct DefaultHost;

#[async_trait]
impl ServiceHost for DefaultHost {
    async fn start(&self) -> Result<(), LifecycleError> {
        info!("base services started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), LifecycleError> {
        info!("base services stopped");
        Ok(())
    }

    async fn wait(&self) -> Result<(), LifecycleError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), LifecycleError> {
        Ok(())
    }
}
