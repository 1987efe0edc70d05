//! File-backed telemetry sink
//!
//! Writes one JSON envelope per line to a run-stamped file under a
//! destination directory. A trailing newline per record keeps the output
//! friendly to log shippers. Submission failures are logged and dropped;
//! only `flush` reports an error.

use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use super::{generate_span_id, SinkError, SpanHandle, TelemetrySink};
use crate::records::{ExceptionRecord, RequestRecord, TraceRecord};

/// One line of sink output
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope<'a> {
    SpanStart {
        span_id: &'a str,
        name: &'a str,
        correlation_id: &'a str,
    },
    Trace {
        #[serde(flatten)]
        record: &'a TraceRecord,
    },
    Exception {
        #[serde(skip_serializing_if = "Option::is_none")]
        span_id: Option<&'a str>,
        #[serde(flatten)]
        record: &'a ExceptionRecord,
    },
    Request {
        span_id: &'a str,
        #[serde(flatten)]
        record: &'a RequestRecord,
    },
}

/// Telemetry sink appending JSONL to a file under `destination`
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Open spans by handle id; exceptions attach to the most recent
    open_spans: HashMap<u64, String>,
    last_started: Option<u64>,
    next_handle: u64,
}

impl JsonlSink {
    /// Create the destination directory and open a run-stamped output file
    pub fn create(destination: &Path) -> Result<Self, SinkError> {
        if !destination.exists() {
            fs::create_dir_all(destination).map_err(SinkError::Open)?;
        }

        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let suffix = hex::encode(&Uuid::new_v4().as_bytes()[..4]);
        let path = destination.join(format!("{stamp}_{suffix}.jsonl"));
        let file = File::create(&path).map_err(SinkError::Open)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            open_spans: HashMap::new(),
            last_started: None,
            next_handle: 0,
        })
    }

    /// Path of the output file for this run
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, envelope: &Envelope<'_>) {
        let line = match serde_json::to_string(envelope) {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to encode telemetry record: {e}");
                return;
            }
        };
        if let Err(e) = writeln!(self.writer, "{line}") {
            warn!("failed to write telemetry record: {e}");
        }
    }
}

impl TelemetrySink for JsonlSink {
    fn start_span(&mut self, name: &str, correlation_id: &str) -> SpanHandle {
        let handle = SpanHandle::new(self.next_handle);
        self.next_handle += 1;

        let span_id = generate_span_id();
        self.write_line(&Envelope::SpanStart {
            span_id: &span_id,
            name,
            correlation_id,
        });
        self.open_spans.insert(handle.id(), span_id);
        self.last_started = Some(handle.id());
        handle
    }

    fn submit_trace(&mut self, record: TraceRecord) {
        self.write_line(&Envelope::Trace { record: &record });
    }

    fn submit_exception(&mut self, record: ExceptionRecord) {
        let span_id = self
            .last_started
            .and_then(|id| self.open_spans.get(&id))
            .cloned();
        self.write_line(&Envelope::Exception {
            span_id: span_id.as_deref(),
            record: &record,
        });
    }

    fn stop_span(&mut self, handle: SpanHandle, record: RequestRecord) {
        let span_id = match self.open_spans.remove(&handle.id()) {
            Some(span_id) => span_id,
            None => {
                warn!("stop_span on unknown handle; emitting record with fresh span id");
                generate_span_id()
            }
        };
        if self.last_started == Some(handle.id()) {
            self.last_started = None;
        }
        self.write_line(&Envelope::Request {
            span_id: &span_id,
            record: &record,
        });
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(SinkError::Flush)?;
        self.writer.get_ref().sync_all().map_err(SinkError::Flush)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PropertyBag, Severity};
    use chrono::Utc;
    use serde_json::Value;

    fn request(correlation_id: &str) -> RequestRecord {
        RequestRecord {
            correlation_id: correlation_id.into(),
            name: "ShouldAdd".into(),
            success: false,
            duration_ms: 42,
            source: "Calc.Tests".into(),
            timestamp: Utc::now(),
            response_code: "500".into(),
            properties: PropertyBag::new(),
        }
    }

    fn read_lines(sink: &JsonlSink) -> Vec<Value> {
        let content = fs::read_to_string(sink.path()).unwrap();
        content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_one_envelope_per_line_in_span_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlSink::create(dir.path()).unwrap();

        let handle = sink.start_span("ShouldAdd", "run-1");
        sink.submit_exception(ExceptionRecord {
            correlation_id: "run-1".into(),
            timestamp: Utc::now(),
            problem_id: "assert failed".into(),
            message: "at Calc.Tests.ShouldAdd()".into(),
            source: "ShouldAdd".into(),
            severity: Severity::Critical,
        });
        sink.stop_span(handle, request("run-1"));
        sink.flush().unwrap();

        let lines = read_lines(&sink);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "span_start");
        assert_eq!(lines[1]["type"], "exception");
        assert_eq!(lines[2]["type"], "request");

        // The exception is attached to the span it was submitted inside
        assert_eq!(lines[1]["span_id"], lines[0]["span_id"]);
        assert_eq!(lines[2]["span_id"], lines[0]["span_id"]);
        assert_eq!(lines[2]["correlation_id"], "run-1");
    }

    #[test]
    fn test_trace_envelope_carries_message_and_severity() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlSink::create(dir.path()).unwrap();

        sink.submit_trace(TraceRecord::message("Test run started", Severity::Information));
        sink.flush().unwrap();

        let lines = read_lines(&sink);
        assert_eq!(lines[0]["type"], "trace");
        assert_eq!(lines[0]["message"], "Test run started");
        assert_eq!(lines[0]["severity"], "Information");
    }

    #[test]
    fn test_create_makes_missing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep/telemetry");
        let sink = JsonlSink::create(&nested).unwrap();
        assert!(sink.path().starts_with(&nested));
    }
}
