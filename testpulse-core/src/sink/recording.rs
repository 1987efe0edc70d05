//! In-memory recording sink
//!
//! Captures every sink call in order so tests can assert on the exact
//! sequence the shell and mapper produce. Doubles as a dry-run sink.

use super::{SinkError, SpanHandle, TelemetrySink};
use crate::records::{ExceptionRecord, RequestRecord, TraceRecord};

/// One recorded sink invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    SpanStarted {
        handle: u64,
        name: String,
        correlation_id: String,
    },
    Trace(TraceRecord),
    Exception(ExceptionRecord),
    SpanStopped {
        handle: u64,
        record: RequestRecord,
    },
    Flushed,
}

/// Sink that records calls instead of transmitting anything
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Vec<SinkCall>,
    next_handle: u64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call, in submission order
    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Submitted request records, in submission order
    pub fn requests(&self) -> Vec<&RequestRecord> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::SpanStopped { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Submitted exception records, in submission order
    pub fn exceptions(&self) -> Vec<&ExceptionRecord> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Exception(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Submitted trace records, in submission order
    pub fn traces(&self) -> Vec<&TraceRecord> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Trace(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SinkCall::Flushed))
            .count()
    }
}

impl TelemetrySink for RecordingSink {
    fn start_span(&mut self, name: &str, correlation_id: &str) -> SpanHandle {
        let handle = SpanHandle::new(self.next_handle);
        self.next_handle += 1;
        self.calls.push(SinkCall::SpanStarted {
            handle: handle.id(),
            name: name.into(),
            correlation_id: correlation_id.into(),
        });
        handle
    }

    fn submit_trace(&mut self, record: TraceRecord) {
        self.calls.push(SinkCall::Trace(record));
    }

    fn submit_exception(&mut self, record: ExceptionRecord) {
        self.calls.push(SinkCall::Exception(record));
    }

    fn stop_span(&mut self, handle: SpanHandle, record: RequestRecord) {
        self.calls.push(SinkCall::SpanStopped {
            handle: handle.id(),
            record,
        });
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.calls.push(SinkCall::Flushed);
        Ok(())
    }
}
