//! The trace-with-memory composition.

use std::sync::Arc;

use sentinel_common_core::MetadataError;
use sentinel_common_log::{NoopSpan, SpanGuard, TraceMetadata, TraceSink, TracingSink};
use tracing::warn;

use crate::config::ProfilerConfig;
use crate::gate::ProfilingGate;
use crate::memory::{MemorySampler, ProcStatusSampler};
use crate::tracker::MemoryTracker;

/// Shared handle to the instrumentation collaborators.
///
/// Owns the configuration flags, the memory sampler and the span backend;
/// [`InstrumentedOperation`] invocations borrow it per call.
pub struct Profiler {
    config: ProfilerConfig,
    sampler: Arc<dyn MemorySampler>,
    sink: Arc<dyn TraceSink>,
}

impl Profiler {
    /// Build a profiler with the production sampler and span backend.
    pub fn new(config: ProfilerConfig) -> Self {
        Self::with_parts(config, Arc::new(ProcStatusSampler), Arc::new(TracingSink))
    }

    /// Build a profiler over explicit collaborators.
    pub fn with_parts(
        config: ProfilerConfig,
        sampler: Arc<dyn MemorySampler>,
        sink: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            config,
            sampler,
            sink,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// A gate answering "is instrumentation currently active".
    pub fn gate(&self) -> ProfilingGate {
        ProfilingGate::new(&self.config, Arc::clone(&self.sink))
    }

    fn start_span(&self, name: &str, metadata: Option<&TraceMetadata>) -> Box<dyn SpanGuard> {
        if self.config.spans_enabled() {
            self.sink.start_span(name, metadata)
        } else {
            Box::new(NoopSpan)
        }
    }
}

/// Metadata derivation for an instrumented operation.
pub type MetadataFn<Args> =
    Box<dyn Fn(&Args) -> Result<TraceMetadata, MetadataError> + Send + Sync>;

/// A named operation wrapped with span timing and memory tracking.
///
/// Invoking the wrapper opens a span named after the operation, derives a
/// correlation id from the call's arguments, runs a [`MemoryTracker`] around
/// the callable and closes the span. The wrapped callable's return value is
/// observably identical to calling it directly; instrumentation is
/// side-effect only.
pub struct InstrumentedOperation<Args> {
    name: String,
    metadata_fn: Option<MetadataFn<Args>>,
}

impl<Args> InstrumentedOperation<Args> {
    /// Create an operation wrapper with no metadata derivation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata_fn: None,
        }
    }

    /// Attach a metadata derivation invoked with each call's arguments.
    ///
    /// The returned mapping is attached to the span at open time; its
    /// `audit_id` entry, if any, becomes the correlation id. Failures are
    /// swallowed: the correlation id degrades to absent and the call
    /// proceeds.
    pub fn with_metadata(
        mut self,
        f: impl Fn(&Args) -> Result<TraceMetadata, MetadataError> + Send + Sync + 'static,
    ) -> Self {
        self.metadata_fn = Some(Box::new(f));
        self
    }

    /// The trace point name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `op` under span timing and memory tracking.
    pub fn invoke<T>(&self, profiler: &Profiler, args: Args, op: impl FnOnce(Args) -> T) -> T {
        let metadata = self.derive_metadata(&args);
        let audit_id = metadata
            .as_ref()
            .and_then(|m| m.get("audit_id"))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            });

        let mut span = profiler.start_span(&self.name, metadata.as_ref());
        let tracker = MemoryTracker::start(
            &self.name,
            audit_id,
            profiler.config().memory_enabled(),
            profiler.sampler.as_ref(),
        );

        let result = op(args);

        tracker.finish(span.as_mut());
        result
    }

    fn derive_metadata(&self, args: &Args) -> Option<TraceMetadata> {
        let f = self.metadata_fn.as_ref()?;
        match f(args) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(operation = %self.name, error = %e, "metadata derivation failed");
                None
            }
        }
    }
}
