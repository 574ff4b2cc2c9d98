//! Shared fakes for instrumentation tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sentinel_common_core::SamplingError;
use sentinel_common_log::{SpanAnnotations, SpanGuard, TraceMetadata, TraceSink};

use crate::memory::{MemoryReading, MemorySampler};

/// Sampler that replays a scripted sequence of readings.
///
/// `None` entries simulate a failed sample. Once the script runs out the
/// sampler keeps failing, which makes over-sampling visible in tests.
pub(crate) struct ScriptedSampler {
    script: Mutex<VecDeque<Option<f64>>>,
    calls: AtomicUsize,
}

impl ScriptedSampler {
    pub fn new(script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MemorySampler for ScriptedSampler {
    fn sample(&self) -> Result<MemoryReading, SamplingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Some(mb)) => Ok(MemoryReading::new(mb)),
            _ => Err(SamplingError::Unsupported),
        }
    }
}

/// One span observed by the [`RecordingSink`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedSpan {
    pub name: String,
    pub metadata: Option<TraceMetadata>,
    pub annotations: Option<SpanAnnotations>,
}

/// Sink that records every span and annotation it sees.
pub(crate) struct RecordingSink {
    pub spans: Arc<Mutex<Vec<RecordedSpan>>>,
    active: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            spans: Arc::new(Mutex::new(Vec::new())),
            active: true,
        }
    }

    pub fn inactive() -> Self {
        Self {
            spans: Arc::new(Mutex::new(Vec::new())),
            active: false,
        }
    }

    pub fn recorded(&self) -> Vec<RecordedSpan> {
        self.spans.lock().unwrap().clone()
    }
}

impl TraceSink for RecordingSink {
    fn is_active(&self) -> bool {
        self.active
    }

    fn start_span(&self, name: &str, metadata: Option<&TraceMetadata>) -> Box<dyn SpanGuard> {
        let mut spans = self.spans.lock().unwrap();
        spans.push(RecordedSpan {
            name: name.to_string(),
            metadata: metadata.cloned(),
            annotations: None,
        });
        let index = spans.len() - 1;
        Box::new(RecordingSpan {
            spans: Arc::clone(&self.spans),
            index,
        })
    }
}

struct RecordingSpan {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
    index: usize,
}

impl SpanGuard for RecordingSpan {
    fn annotate(&mut self, annotations: &SpanAnnotations) {
        if let Some(span) = self.spans.lock().unwrap().get_mut(self.index) {
            span.annotations = Some(annotations.clone());
        }
    }
}
