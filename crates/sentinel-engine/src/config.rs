//! Engine configuration.

use std::path::Path;

use sentinel_common_core::{Error, Result};
use sentinel_profiling::ProfilerConfig;
use serde::{Deserialize, Serialize};

/// Root configuration for the engine process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Service name reported to the profiler backend.
    pub service_name: String,
    /// Profiling instrumentation options.
    pub profiler: ProfilerConfig,
    /// Background scheduler options.
    pub scheduler: SchedulerConfig,
    /// Continuous audit handler options.
    pub continuous: ContinuousConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_name: "decision-engine".to_string(),
            profiler: ProfilerConfig::default(),
            scheduler: SchedulerConfig::default(),
            continuous: ContinuousConfig::default(),
        }
    }
}

/// Background scheduler options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How often the scheduler checks for due jobs, in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
        }
    }
}

/// Continuous audit handler options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuousConfig {
    /// How often continuous audits are launched, in milliseconds.
    pub audit_interval_ms: u64,
}

impl Default for ContinuousConfig {
    fn default() -> Self {
        Self {
            audit_interval_ms: 30_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file, or defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&raw)
                    .map_err(|e| Error::config(format!("{}: {e}", path.display())))
            }
            None => Ok(Self::default()),
        }
    }
}
