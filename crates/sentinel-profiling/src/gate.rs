//! Predicate for "is instrumentation currently active".

use std::sync::Arc;

use sentinel_common_log::TraceSink;

use crate::config::ProfilerConfig;

/// Answers whether profiling is live right now.
///
/// Profiling is active only when the master configuration switch is on and
/// the trace backend reports an active session; expensive sampling is skipped
/// entirely otherwise.
pub struct ProfilingGate {
    enabled: bool,
    sink: Arc<dyn TraceSink>,
}

impl ProfilingGate {
    /// Build a gate over the given configuration and span backend.
    pub fn new(config: &ProfilerConfig, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            enabled: config.enabled,
            sink,
        }
    }

    /// Whether instrumentation is currently active.
    pub fn enabled(&self) -> bool {
        self.enabled && self.sink.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    fn config(enabled: bool) -> ProfilerConfig {
        ProfilerConfig {
            enabled,
            ..ProfilerConfig::default()
        }
    }

    #[test]
    fn requires_both_flag_and_active_session() {
        let gate = ProfilingGate::new(&config(true), Arc::new(RecordingSink::new()));
        assert!(gate.enabled());

        let gate = ProfilingGate::new(&config(false), Arc::new(RecordingSink::new()));
        assert!(!gate.enabled());

        let gate = ProfilingGate::new(&config(true), Arc::new(RecordingSink::inactive()));
        assert!(!gate.enabled());
    }
}
