//! Profiler configuration.

use serde::{Deserialize, Serialize};

/// Options controlling the profiling instrumentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Master switch. Also gates whether the profiler backend is
    /// initialized at process start.
    pub enabled: bool,
    /// Profile audit execution timing. When enabled, audit picking and
    /// execution operations are instrumented with trace spans.
    pub trace_audit_execution: bool,
    /// Track memory usage during audit operations. When enabled, memory
    /// metrics (baseline, peak, delta) are captured and attached to traces.
    pub trace_memory_usage: bool,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trace_audit_execution: true,
            trace_memory_usage: true,
        }
    }
}

impl ProfilerConfig {
    /// Whether trace spans should be opened around operations.
    pub fn spans_enabled(&self) -> bool {
        self.enabled && self.trace_audit_execution
    }

    /// Whether memory baseline/peak sampling should run around operations.
    pub fn memory_enabled(&self) -> bool {
        self.enabled && self.trace_memory_usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_registered_options() {
        let config = ProfilerConfig::default();
        assert!(!config.enabled);
        assert!(config.trace_audit_execution);
        assert!(config.trace_memory_usage);
    }

    #[test]
    fn master_switch_gates_both_concerns() {
        let config = ProfilerConfig::default();
        assert!(!config.spans_enabled());
        assert!(!config.memory_enabled());

        let config = ProfilerConfig {
            enabled: true,
            ..ProfilerConfig::default()
        };
        assert!(config.spans_enabled());
        assert!(config.memory_enabled());
    }

    #[test]
    fn flags_toggle_independently() {
        let config = ProfilerConfig {
            enabled: true,
            trace_audit_execution: false,
            trace_memory_usage: true,
        };
        assert!(!config.spans_enabled());
        assert!(config.memory_enabled());

        let config = ProfilerConfig {
            enabled: true,
            trace_audit_execution: true,
            trace_memory_usage: false,
        };
        assert!(config.spans_enabled());
        assert!(!config.memory_enabled());
    }

    #[test]
    fn partial_yaml_merges_with_defaults() {
        let config: ProfilerConfig = serde_yaml::from_str("enabled: true").unwrap();
        assert!(config.enabled);
        assert!(config.trace_audit_execution);
        assert!(config.trace_memory_usage);
    }
}
