//! Plugin shell
//!
//! Bridges the host runner's lifecycle callbacks to the mapper and owns the
//! sink for the lifetime of one run. The shell is the only stateful piece:
//!
//! ```text
//! Unconfigured --(connection string present)--> Configured --(RunComplete)--> Flushed
//! ```
//!
//! Unconfigured is permanent for the run: no sink is ever constructed and
//! every event is ignored. Configured handlers run behind an isolation
//! boundary - a panic while mapping one test result is logged and must not
//! abort telemetry for the remaining events. Flushed ignores everything;
//! the flush happens exactly once.

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

use crate::buildmeta::BuildMetadata;
use crate::config::{LoggerParams, CONNECTION_STRING_KEY};
use crate::debug::DebugTrace;
use crate::harness::events::{DiscoveryCompletePayload, TestCaseDescriptor, TestResultPayload};
use crate::harness::RunObserver;
use crate::mapper::{self, RunContext};
use crate::records::{Severity, TraceRecord};
use crate::sink::{SinkError, TelemetrySink};

/// The telemetry plugin: a [`RunObserver`] wired to a sink
pub struct TestRunLogger<S: TelemetrySink> {
    active: Option<Active<S>>,
    flush_error: Option<SinkError>,
}

/// State held only while telemetry is enabled
struct Active<S> {
    ctx: RunContext,
    sink: S,
    build: BuildMetadata,
    debug: DebugTrace,
    flushed: bool,
}

impl<S: TelemetrySink> TestRunLogger<S> {
    /// Configure from activation parameters, reading CI metadata from the
    /// process environment.
    ///
    /// Without a connection string this logs one line and produces an inert
    /// logger: `make_sink` is never invoked and no sink call ever happens.
    pub fn configure<F>(params: &LoggerParams, make_sink: F) -> Result<Self, SinkError>
    where
        F: FnOnce(&str) -> Result<S, SinkError>,
    {
        Self::configure_with(params, BuildMetadata::from_env(), make_sink)
    }

    /// Configure with explicit CI metadata (tests inject their own)
    pub fn configure_with<F>(
        params: &LoggerParams,
        build: BuildMetadata,
        make_sink: F,
    ) -> Result<Self, SinkError>
    where
        F: FnOnce(&str) -> Result<S, SinkError>,
    {
        let Some(connection_string) = params.connection_string.as_deref() else {
            info!("no {CONNECTION_STRING_KEY} provided, no telemetry will be sent");
            return Ok(Self {
                active: None,
                flush_error: None,
            });
        };

        let mut sink = make_sink(connection_string)?;
        let ctx = RunContext::new(connection_string, params.debug);

        info!(
            run_id = %ctx.run_id,
            "{CONNECTION_STRING_KEY} provided, telemetry will be sent"
        );
        sink.submit_trace(TraceRecord::message("Test run started", Severity::Information));

        Ok(Self {
            active: Some(Active {
                ctx,
                sink,
                build,
                debug: DebugTrace::new(params.debug),
                flushed: false,
            }),
            flush_error: None,
        })
    }

    /// Whether telemetry is enabled for this run
    pub fn is_configured(&self) -> bool {
        self.active.is_some()
    }

    /// The run correlation id, when configured
    pub fn run_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.ctx.run_id.as_str())
    }

    /// Error from the final flush, if it failed
    pub fn flush_error(&self) -> Option<&SinkError> {
        self.flush_error.as_ref()
    }

    /// Borrow the sink (tests inspect recorded calls through this)
    pub fn sink(&self) -> Option<&S> {
        self.active.as_ref().map(|a| &a.sink)
    }

    /// Redirect diagnostic lines into a buffer instead of stderr and return
    /// it. The `Debug` gate keeps applying; `None` when unconfigured.
    pub fn capture_diagnostics(&mut self) -> Option<std::sync::Arc<std::sync::Mutex<Vec<String>>>> {
        let active = self.active.as_mut()?;
        let (trace, lines) = DebugTrace::captured(active.debug.enabled());
        active.debug = trace;
        Some(lines)
    }

    /// Run a handler behind the isolation boundary: skipped when inert or
    /// already flushed, and a panic is contained to this one event.
    fn isolated(&mut self, label: &str, handler: impl FnOnce(&mut Active<S>)) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.flushed {
            debug!("ignoring {label} after final flush");
            return;
        }
        if catch_unwind(AssertUnwindSafe(|| handler(active))).is_err() {
            warn!("{label} handler failed; continuing with remaining events");
        }
    }
}

impl<S: TelemetrySink> RunObserver for TestRunLogger<S> {
    fn on_discovery_complete(&mut self, payload: &DiscoveryCompletePayload) {
        self.isolated("DiscoveryComplete", |active| {
            active.debug.line_with(|| {
                format!("discovery finished: {} test case(s)", payload.total_discovered)
            });
            active.sink.submit_trace(mapper::discovery_summary_trace(payload));
        });
    }

    fn on_tests_discovered(&mut self, test_cases: &[TestCaseDescriptor]) {
        self.isolated("TestsDiscovered", |active| {
            active
                .debug
                .line_with(|| format!("discovered {} test case(s)", test_cases.len()));
            for descriptor in test_cases {
                active
                    .debug
                    .line_with(|| format!("discovered test {}", descriptor.display_name));
                active.sink.submit_trace(mapper::discovery_trace(descriptor));
            }
        });
    }

    fn on_test_result(&mut self, payload: &TestResultPayload) {
        self.isolated("TestResult", |active| {
            let descriptor = &payload.test_case;
            active
                .debug
                .line_with(|| format!("tracking request: {}", descriptor.display_name));
            for t in &descriptor.traits {
                active.debug.line_with(|| format!("{} - {}", t.name, t.value));
            }
            for category in &descriptor.categories {
                active.debug.line_with(|| format!("TestCategory: {category}"));
            }

            let (record, exception) = mapper::map_test_result(payload, &active.ctx, &active.build);

            // Correlated operation: exception goes out inside the span of
            // its request record so the backend can link them.
            let span = active.sink.start_span(&record.name, &active.ctx.run_id);
            if let Some(exception) = exception {
                active
                    .debug
                    .line_with(|| format!("tracking exception: {}", exception.problem_id));
                active.sink.submit_exception(exception);
            }
            active.sink.stop_span(span, record);
        });
    }

    fn on_run_complete(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.flushed {
            debug!("duplicate RunComplete ignored; telemetry already flushed");
            return;
        }
        active.flushed = true;

        active.debug.line("flushing telemetry");
        info!("test run completed, flushing telemetry");
        if let Err(e) = active.sink.flush() {
            error!("final telemetry flush failed: {e}");
            self.flush_error = Some(e);
        }
    }
}
