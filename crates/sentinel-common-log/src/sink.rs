//! Trace-span seam over the distributed tracing backend.
//!
//! The profiling layer never talks to the span backend directly; it goes
//! through [`TraceSink`] so that span creation can be swapped out (or turned
//! into a no-op) without touching the instrumentation logic.

use tracing::Span;

/// Arbitrary metadata attached to a span at open time.
pub type TraceMetadata = serde_json::Map<String, serde_json::Value>;

/// Measurements attached to a span when an instrumented operation finishes.
///
/// The key set published to the backend is fixed: `memory_baseline_mb`,
/// `memory_peak_mb`, `memory_delta_mb` and `audit_id` (null when no
/// correlation id was derived).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanAnnotations {
    /// Resident set size when the operation began, in MB.
    pub memory_baseline_mb: Option<f64>,
    /// Resident set size when the operation finished, in MB.
    pub memory_peak_mb: Option<f64>,
    /// `peak - baseline`, in MB.
    pub memory_delta_mb: Option<f64>,
    /// Correlation id of the domain record being operated on.
    pub audit_id: Option<String>,
}

impl SpanAnnotations {
    /// Render the annotations as backend metadata with the fixed key set.
    pub fn to_metadata(&self) -> TraceMetadata {
        let mut map = TraceMetadata::new();
        map.insert("memory_baseline_mb".into(), float_or_null(self.memory_baseline_mb));
        map.insert("memory_peak_mb".into(), float_or_null(self.memory_peak_mb));
        map.insert("memory_delta_mb".into(), float_or_null(self.memory_delta_mb));
        map.insert(
            "audit_id".into(),
            match &self.audit_id {
                Some(id) => serde_json::Value::String(id.clone()),
                None => serde_json::Value::Null,
            },
        );
        map
    }
}

fn float_or_null(value: Option<f64>) -> serde_json::Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// An open span. Closing happens when the guard is dropped.
pub trait SpanGuard: Send {
    /// Attach result annotations to the span before it closes.
    fn annotate(&mut self, annotations: &SpanAnnotations);
}

/// Entry point into the span backend.
pub trait TraceSink: Send + Sync {
    /// Whether a trace session is currently being collected.
    fn is_active(&self) -> bool;

    /// Open a span with the given name and optional open-time metadata.
    fn start_span(&self, name: &str, metadata: Option<&TraceMetadata>) -> Box<dyn SpanGuard>;
}

/// Span guard that discards everything. Used when span creation is disabled
/// but the surrounding composition still runs.
#[derive(Debug, Default)]
pub struct NoopSpan;

impl SpanGuard for NoopSpan {
    fn annotate(&mut self, _annotations: &SpanAnnotations) {}
}

/// Production sink backed by the `tracing` ecosystem.
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn is_active(&self) -> bool {
        // Analogue of "is there an active profiler session": the current
        // span must exist and be enabled by the subscriber.
        !Span::current().is_none()
    }

    fn start_span(&self, name: &str, metadata: Option<&TraceMetadata>) -> Box<dyn SpanGuard> {
        let span = tracing::info_span!("operation", name = %name);
        if let Some(meta) = metadata {
            span.in_scope(|| {
                tracing::debug!(
                    metadata = %serde_json::Value::Object(meta.clone()),
                    "span opened"
                );
            });
        }
        Box::new(TracingSpanGuard { span })
    }
}

struct TracingSpanGuard {
    span: Span,
}

impl SpanGuard for TracingSpanGuard {
    fn annotate(&mut self, annotations: &SpanAnnotations) {
        self.span.in_scope(|| {
            tracing::info!(
                memory_baseline_mb = annotations.memory_baseline_mb,
                memory_peak_mb = annotations.memory_peak_mb,
                memory_delta_mb = annotations.memory_delta_mb,
                audit_id = annotations.audit_id.as_deref(),
                "operation measured"
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_render_the_fixed_key_set() {
        let annotations = SpanAnnotations {
            memory_baseline_mb: Some(100.0),
            memory_peak_mb: Some(140.0),
            memory_delta_mb: Some(40.0),
            audit_id: Some("a-1".into()),
        };
        let meta = annotations.to_metadata();
        let keys: Vec<&String> = meta.keys().collect();
        assert_eq!(
            keys,
            ["memory_baseline_mb", "memory_peak_mb", "memory_delta_mb", "audit_id"]
        );
        assert_eq!(meta["memory_delta_mb"], serde_json::json!(40.0));
        assert_eq!(meta["audit_id"], serde_json::json!("a-1"));
    }

    #[test]
    fn absent_audit_id_renders_as_null() {
        let meta = SpanAnnotations::default().to_metadata();
        assert!(meta["audit_id"].is_null());
        assert!(meta["memory_baseline_mb"].is_null());
    }

    #[test]
    fn tracing_sink_is_inactive_outside_any_span() {
        assert!(!TracingSink.is_active());
    }
}
