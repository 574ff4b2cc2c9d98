//! Profiler backend registration.

use sentinel_common_core::{InitError, PROJECT};
use sentinel_common_log::TraceMetadata;
use tracing::info;

/// Identity of this process, sent to the profiler backend at registration.
#[derive(Debug, Clone)]
pub struct ProcessIdentity {
    /// Project the process belongs to.
    pub project: &'static str,
    /// Service name within the project.
    pub service: String,
    /// Host the process runs on.
    pub host: String,
    /// Caller context serialized to a mapping (e.g. admin credentials).
    pub context: TraceMetadata,
}

impl ProcessIdentity {
    /// Build the identity for this host.
    pub fn local(service: impl Into<String>, context: TraceMetadata) -> Result<Self, InitError> {
        let host = hostname::get()
            .map_err(|e| InitError::Identity(format!("hostname resolution failed: {e}")))?
            .to_string_lossy()
            .into_owned();

        Ok(Self {
            project: PROJECT,
            service: service.into(),
            host,
            context,
        })
    }
}

/// The external profiler backend.
///
/// Initialization may fail; callers at the lifecycle boundary log the
/// failure and continue with profiling disabled.
pub trait ProfilerBackend: Send + Sync {
    /// Register this process with the backend.
    fn init(&self, identity: &ProcessIdentity) -> Result<(), InitError>;
}

/// Backend stand-in that records the registration in the process log.
#[derive(Debug, Default)]
pub struct LoggingBackend;

impl ProfilerBackend for LoggingBackend {
    fn init(&self, identity: &ProcessIdentity) -> Result<(), InitError> {
        info!(
            project = identity.project,
            service = %identity.service,
            host = %identity.host,
            "profiler backend initialized"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_identity_carries_the_project_constant() {
        let identity = ProcessIdentity::local("decision-engine", TraceMetadata::new()).unwrap();
        assert_eq!(identity.project, "sentinel");
        assert_eq!(identity.service, "decision-engine");
        assert!(!identity.host.is_empty());
    }

    #[test]
    fn logging_backend_accepts_registration() {
        let identity = ProcessIdentity::local("decision-engine", TraceMetadata::new()).unwrap();
        assert!(LoggingBackend.init(&identity).is_ok());
    }
}
