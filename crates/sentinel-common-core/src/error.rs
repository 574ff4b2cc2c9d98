//! Error types for Sentinel.

use thiserror::Error;

/// The main error type for Sentinel operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error with custom message.
    #[error("{0}")]
    Generic(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Subservice lifecycle error.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl Error {
    /// Create a new generic error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using Sentinel's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// A process memory sample could not be taken.
///
/// Always recovered locally: call sites log a warning and degrade the
/// affected reading to absent.
#[derive(Error, Debug)]
pub enum SamplingError {
    /// The platform memory source could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Source file that failed to open or read.
        path: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The memory source was readable but missing the expected field.
    #[error("no {field} entry found in {path}")]
    Missing {
        /// Field that was expected.
        field: &'static str,
        /// Source file that was parsed.
        path: &'static str,
    },

    /// Resident-set sampling is not available on this platform.
    #[error("resident-set sampling is not supported on this platform")]
    Unsupported,
}

/// Trace metadata could not be derived from an operation's arguments.
///
/// Recovered locally: the correlation id degrades to absent and the
/// operation still runs.
#[derive(Error, Debug)]
#[error("metadata derivation for `{operation}` failed: {reason}")]
pub struct MetadataError {
    /// Name of the instrumented operation.
    pub operation: String,
    /// Human-readable failure description.
    pub reason: String,
}

impl MetadataError {
    /// Create a metadata error for the named operation.
    pub fn new(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Profiler backend initialization failed.
///
/// Recovered at the lifecycle boundary: the process comes up with
/// profiling disabled.
#[derive(Error, Debug)]
pub enum InitError {
    /// The profiler backend rejected or never acknowledged the registration.
    #[error("profiler backend registration failed: {0}")]
    Backend(String),

    /// Process identity could not be assembled.
    #[error("invalid process identity: {0}")]
    Identity(String),
}

/// A subservice failed during a lifecycle transition.
///
/// Never recovered here: surfaced to the process supervisor as fatal to
/// that transition.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// A subservice failed to start.
    #[error("{service} failed to start: {reason}")]
    Start {
        /// Subservice that failed.
        service: &'static str,
        /// Failure description.
        reason: String,
    },

    /// A subservice failed to stop.
    #[error("{service} failed to stop: {reason}")]
    Stop {
        /// Subservice that failed.
        service: &'static str,
        /// Failure description.
        reason: String,
    },

    /// Waiting on a subservice was interrupted.
    #[error("wait on {service} failed: {reason}")]
    Wait {
        /// Subservice that failed.
        service: &'static str,
        /// Failure description.
        reason: String,
    },

    /// A subservice failed to reset.
    #[error("{service} failed to reset: {reason}")]
    Reset {
        /// Subservice that failed.
        service: &'static str,
        /// Failure description.
        reason: String,
    },

    /// A transition was requested from a state that does not allow it.
    #[error("invalid lifecycle transition: {transition} from {state}")]
    InvalidTransition {
        /// Requested transition.
        transition: &'static str,
        /// State the service was in.
        state: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_error_names_the_source() {
        let err = SamplingError::Missing {
            field: "VmRSS",
            path: "/proc/self/status",
        };
        assert_eq!(err.to_string(), "no VmRSS entry found in /proc/self/status");
    }

    #[test]
    fn lifecycle_error_converts_into_top_level_error() {
        let err: Error = LifecycleError::Start {
            service: "scheduler",
            reason: "channel closed".into(),
        }
        .into();
        assert!(err.to_string().contains("scheduler failed to start"));
    }

    #[test]
    fn metadata_error_display() {
        let err = MetadataError::new("audit-execute", "missing uuid");
        assert_eq!(
            err.to_string(),
            "metadata derivation for `audit-execute` failed: missing uuid"
        );
    }
}
