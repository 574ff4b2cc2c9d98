//! Sentinel decision-engine worker process.
//!
//! The engine owns a base service surface (RPC, notifications, heartbeat),
//! a background scheduling service for periodic jobs and a continuous audit
//! handler, and drives them through an ordered start/stop/wait/reset
//! lifecycle.

pub mod config;
pub mod continuous;
pub mod host;
pub mod scheduler;
pub mod service;
pub mod subservice;

pub use config::{ContinuousConfig, EngineConfig, SchedulerConfig};
pub use continuous::{AuditRequest, ContinuousAuditHandler};
pub use host::{DefaultHost, ServiceHost};
pub use scheduler::{JobSender, PeriodicJob, SchedulingService};
pub use service::{EngineService, LifecycleState};
pub use subservice::Subservice;
