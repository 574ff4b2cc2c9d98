//! Scoped memory measurement around one instrumented operation.

use sentinel_common_log::{SpanAnnotations, SpanGuard};
use tracing::warn;

use crate::memory::{MemoryReading, MemorySampler};

/// Tracks the resident-set delta across one operation.
///
/// A tracker is created per invocation, exclusively owned by it, and
/// discarded afterwards. The baseline is captured at construction iff memory
/// tracking is enabled and the sample succeeds; peak and delta are only ever
/// computed when a baseline exists, so a partial measurement (peak without
/// baseline) is never published.
pub struct MemoryTracker<'a> {
    trace_name: String,
    audit_id: Option<String>,
    sampler: &'a dyn MemorySampler,
    enabled: bool,
    baseline: Option<MemoryReading>,
    peak: Option<MemoryReading>,
}

impl<'a> MemoryTracker<'a> {
    /// Begin tracking: capture the baseline reading if enabled.
    ///
    /// A failed sample is logged at warning level and leaves the baseline
    /// absent; it never propagates to the caller.
    pub fn start(
        trace_name: impl Into<String>,
        audit_id: Option<String>,
        enabled: bool,
        sampler: &'a dyn MemorySampler,
    ) -> Self {
        let trace_name = trace_name.into();
        let baseline = if enabled {
            match sampler.sample() {
                Ok(reading) => Some(reading),
                Err(e) => {
                    warn!(trace_name = %trace_name, error = %e, "failed to capture baseline memory");
                    None
                }
            }
        } else {
            None
        };

        Self {
            trace_name,
            audit_id,
            sampler,
            enabled,
            baseline,
            peak: None,
        }
    }

    /// Finish tracking: capture the peak reading and publish the measurement
    /// triple to the given span.
    ///
    /// Publishes nothing when tracking is disabled, when the baseline was
    /// never captured, or when the peak sample fails (logged at warning
    /// level). Never raises.
    pub fn finish(mut self, span: &mut dyn SpanGuard) {
        if !self.enabled {
            return;
        }
        let Some(baseline) = self.baseline else {
            return;
        };

        match self.sampler.sample() {
            Ok(peak) => {
                let delta = peak.resident_set_mb - baseline.resident_set_mb;
                span.annotate(&SpanAnnotations {
                    memory_baseline_mb: Some(baseline.resident_set_mb),
                    memory_peak_mb: Some(peak.resident_set_mb),
                    memory_delta_mb: Some(delta),
                    audit_id: self.audit_id.take(),
                });
                self.peak = Some(peak);
            }
            Err(e) => {
                warn!(trace_name = %self.trace_name, error = %e, "failed to capture peak memory");
            }
        }
    }

    /// The baseline reading, if one was captured.
    pub fn baseline(&self) -> Option<&MemoryReading> {
        self.baseline.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, ScriptedSampler};
    use sentinel_common_log::TraceSink;

    #[test]
    fn publishes_baseline_peak_and_delta() {
        let sampler = ScriptedSampler::new([Some(100.0), Some(140.0)]);
        let sink = RecordingSink::new();
        let mut span = sink.start_span("audit-execute", None);

        let tracker = MemoryTracker::start("audit-execute", Some("a-1".into()), true, &sampler);
        tracker.finish(span.as_mut());

        let spans = sink.recorded();
        let annotations = spans[0].annotations.clone().unwrap();
        assert_eq!(annotations.memory_baseline_mb, Some(100.0));
        assert_eq!(annotations.memory_peak_mb, Some(140.0));
        assert_eq!(annotations.memory_delta_mb, Some(40.0));
        assert_eq!(annotations.audit_id.as_deref(), Some("a-1"));
    }

    #[test]
    fn disabled_tracker_never_samples() {
        let sampler = ScriptedSampler::new([Some(100.0), Some(140.0)]);
        let sink = RecordingSink::new();
        let mut span = sink.start_span("audit-execute", None);

        let tracker = MemoryTracker::start("audit-execute", None, false, &sampler);
        tracker.finish(span.as_mut());

        assert_eq!(sampler.calls(), 0);
        assert!(sink.recorded()[0].annotations.is_none());
    }

    #[test]
    fn failed_baseline_suppresses_publication() {
        let sampler = ScriptedSampler::new([None, Some(140.0)]);
        let sink = RecordingSink::new();
        let mut span = sink.start_span("audit-execute", None);

        let tracker = MemoryTracker::start("audit-execute", None, true, &sampler);
        assert!(tracker.baseline().is_none());
        tracker.finish(span.as_mut());

        // Only the baseline attempt; no peak sample once the baseline is gone.
        assert_eq!(sampler.calls(), 1);
        assert!(sink.recorded()[0].annotations.is_none());
    }

    #[test]
    fn failed_peak_suppresses_publication() {
        let sampler = ScriptedSampler::new([Some(100.0), None]);
        let sink = RecordingSink::new();
        let mut span = sink.start_span("audit-execute", None);

        let tracker = MemoryTracker::start("audit-execute", None, true, &sampler);
        tracker.finish(span.as_mut());

        assert_eq!(sampler.calls(), 2);
        assert!(sink.recorded()[0].annotations.is_none());
    }

    #[test]
    fn delta_is_exactly_peak_minus_baseline() {
        let sampler = ScriptedSampler::new([Some(123.5), Some(120.25)]);
        let sink = RecordingSink::new();
        let mut span = sink.start_span("audit-execute", None);

        MemoryTracker::start("audit-execute", None, true, &sampler).finish(span.as_mut());

        let annotations = sink.recorded()[0].annotations.clone().unwrap();
        assert_eq!(annotations.memory_delta_mb, Some(120.25 - 123.5));
    }
}
