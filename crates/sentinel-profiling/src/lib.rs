//! Profiling instrumentation for Sentinel audit operations.
//!
//! Two composable concerns live here: opening a named trace span around an
//! operation, and measuring the process resident-set delta across it. Both
//! are gated by independent configuration flags and neither may alter the
//! outcome of the operation being measured.

pub mod backend;
pub mod config;
pub mod gate;
pub mod memory;
pub mod tracker;
pub mod trace;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{LoggingBackend, ProcessIdentity, ProfilerBackend};
pub use config::ProfilerConfig;
pub use gate::ProfilingGate;
pub use memory::{MemoryReading, MemorySampler, ProcStatusSampler};
pub use trace::{InstrumentedOperation, Profiler};
pub use tracker::MemoryTracker;
