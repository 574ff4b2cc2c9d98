//! Process memory sampling.

use chrono::{DateTime, Utc};
use sentinel_common_core::SamplingError;

/// A single point-in-time measurement of process memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryReading {
    /// Resident set size in MB.
    pub resident_set_mb: f64,
    /// When the sample was taken.
    pub captured_at: DateTime<Utc>,
}

impl MemoryReading {
    /// Create a reading captured now.
    pub fn new(resident_set_mb: f64) -> Self {
        Self {
            resident_set_mb,
            captured_at: Utc::now(),
        }
    }
}

/// Source of resident-set measurements for the current process.
///
/// Sampling is a bounded, blocking read; a failed sample degrades the one
/// measurement that asked for it and is never retried.
pub trait MemorySampler: Send + Sync {
    /// Sample the current resident set size.
    fn sample(&self) -> Result<MemoryReading, SamplingError>;
}

/// Sampler reading `VmRSS` from `/proc/self/status`.
#[derive(Debug, Default)]
pub struct ProcStatusSampler;

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
const PROC_STATUS: &str = "/proc/self/status";

impl MemorySampler for ProcStatusSampler {
    #[cfg(target_os = "linux")]
    fn sample(&self) -> Result<MemoryReading, SamplingError> {
        let status = std::fs::read_to_string(PROC_STATUS).map_err(|source| {
            SamplingError::Read {
                path: PROC_STATUS,
                source,
            }
        })?;

        parse_vm_rss_mb(&status)
            .map(MemoryReading::new)
            .ok_or(SamplingError::Missing {
                field: "VmRSS",
                path: PROC_STATUS,
            })
    }

    #[cfg(not(target_os = "linux"))]
    fn sample(&self) -> Result<MemoryReading, SamplingError> {
        Err(SamplingError::Unsupported)
    }
}

/// Extract the VmRSS value in MB from `/proc/self/status` content.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_rss_mb(status: &str) -> Option<f64> {
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            if let Some(kb) = rest.split_whitespace().next() {
                if let Ok(kb) = kb.parse::<f64>() {
                    return Some(kb / 1024.0);
                }
            }
        }
    }
    None
}
