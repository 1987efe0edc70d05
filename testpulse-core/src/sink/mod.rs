//! Telemetry sink contract
//!
//! The sink is an external collaborator: it owns batching, transport, and
//! retries. This module defines only the seam the mapper talks through,
//! plus two bundled implementations:
//!
//! - [`JsonlSink`] - appends records to a run-stamped `.jsonl` file
//! - [`RecordingSink`] - in-memory capture for tests
//!
//! The one ordering contract the sink must honor: for a failed test, the
//! exception is submitted while its request span is open
//! (start span -> submit exception -> stop span). Backend trace-to-exception
//! linking depends on it.

mod jsonl;
mod recording;

pub use jsonl::JsonlSink;
pub use recording::{RecordingSink, SinkCall};

use thiserror::Error;
use uuid::Uuid;

use crate::records::{ExceptionRecord, RequestRecord, TraceRecord};

/// Sink failures. Per-record submission is fire-and-forget (implementations
/// log and carry on); only `flush` surfaces an error to the caller.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open telemetry output: {0}")]
    Open(#[source] std::io::Error),

    #[error("failed to flush telemetry: {0}")]
    Flush(#[source] std::io::Error),
}

/// Opaque handle to an open span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanHandle(u64);

impl SpanHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Submission seam between the mapper and the telemetry backend
pub trait TelemetrySink {
    /// Open a span for one logical unit of work (one test result)
    fn start_span(&mut self, name: &str, correlation_id: &str) -> SpanHandle;

    /// Submit a trace record (discovery traces, lifecycle markers)
    fn submit_trace(&mut self, record: TraceRecord);

    /// Submit an exception record; attaches to the currently open span
    fn submit_exception(&mut self, record: ExceptionRecord);

    /// Close a span, submitting its finished request record
    fn stop_span(&mut self, handle: SpanHandle, record: RequestRecord);

    /// Block until everything submitted so far is durably written
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// Generate a unique 16-character hex span ID (8 bytes).
pub(crate) fn generate_span_id() -> String {
    let uuid = Uuid::now_v7();
    hex::encode(&uuid.as_bytes()[8..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_ids_are_16_hex_chars_and_unique() {
        let a = generate_span_id();
        let b = generate_span_id();
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
