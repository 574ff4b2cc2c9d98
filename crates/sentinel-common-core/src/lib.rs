//! Sentinel common core types and utilities.

pub mod error;

pub use error::{Error, InitError, LifecycleError, MetadataError, Result, SamplingError};

/// Project identifier attached to profiler backend registrations.
pub const PROJECT: &str = "sentinel";
