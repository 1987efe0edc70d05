//! Event-to-record mapping
//!
//! The correctness-critical piece: turns one lifecycle event into the
//! telemetry records it implies. Every function here is pure - IO, span
//! orchestration, and error isolation live in the shell, so these rules
//! can be tested as plain data transforms.
//!
//! The record pair for a failed test shares one correlation id and one
//! timestamp; the shell submits the exception inside the request's span.

use chrono::Utc;
use uuid::Uuid;

use crate::buildmeta::BuildMetadata;
use crate::classify;
use crate::harness::events::{
    DiscoveryCompletePayload, TestCaseDescriptor, TestResultPayload,
};
use crate::harness::types::TestOutcome;
use crate::records::{
    ExceptionRecord, PropertyBag, RequestRecord, Severity, TraceRecord,
};

/// Per-activation run state.
///
/// Created once when the plugin is configured and passed explicitly into
/// every mapping call; the run id correlates every record of the run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Run-wide correlation identifier, generated once
    pub run_id: String,

    /// Configured transmission endpoint
    pub connection_string: String,

    /// Whether verbose local diagnostics are on
    pub debug: bool,
}

impl RunContext {
    pub fn new(connection_string: impl Into<String>, debug: bool) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            connection_string: connection_string.into(),
            debug,
        }
    }
}

/// Derive the logical source of a test: its containing class/module name.
///
/// Strips a trailing `".{display_name}"` from the fully-qualified name.
/// When there is nothing to strip (name not dotted, or the fqn does not end
/// with the display name) the fully-qualified name is used unmodified.
pub fn logical_source<'a>(fully_qualified_name: &'a str, display_name: &str) -> &'a str {
    fully_qualified_name
        .strip_suffix(display_name)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or(fully_qualified_name)
}

/// Map one completed test case into its request record and, for failures,
/// the linked exception record.
pub fn map_test_result(
    payload: &TestResultPayload,
    ctx: &RunContext,
    build: &BuildMetadata,
) -> (RequestRecord, Option<ExceptionRecord>) {
    let descriptor = &payload.test_case;

    let mut properties = PropertyBag::new();
    properties.set("TestCaseId", &descriptor.id);
    properties.set_optional("ErrorMessage", payload.error_message.as_deref());
    properties.set_optional("ErrorStackTrace", payload.error_stack_trace.as_deref());
    for (key, value) in build.entries() {
        properties.set_optional(key, value);
    }
    for t in &descriptor.traits {
        properties.set(&t.name, &t.value);
    }
    for category in &descriptor.categories {
        properties.add_category(category);
    }

    let record = RequestRecord {
        correlation_id: ctx.run_id.clone(),
        name: descriptor.display_name.clone(),
        success: classify::is_success(payload.outcome),
        duration_ms: payload.duration_ms,
        source: logical_source(&descriptor.fully_qualified_name, &descriptor.display_name)
            .to_string(),
        timestamp: payload.started_at,
        response_code: classify::response_code(payload.outcome).to_string(),
        properties,
    };

    let exception = (payload.outcome == TestOutcome::Failed).then(|| ExceptionRecord {
        correlation_id: ctx.run_id.clone(),
        timestamp: payload.started_at,
        problem_id: payload.error_message.clone().unwrap_or_default(),
        message: payload.error_stack_trace.clone().unwrap_or_default(),
        source: descriptor.display_name.clone(),
        severity: Severity::Critical,
    });

    (record, exception)
}

/// Map one discovered test case into its discovery trace.
///
/// The host supplies no discovery timestamp, so the record is stamped at
/// creation time. Properties carry the descriptor's traits and categories
/// in declared order; there is no run correlation - discovery may happen
/// outside any run.
pub fn discovery_trace(descriptor: &TestCaseDescriptor) -> TraceRecord {
    let mut properties = PropertyBag::new();
    for t in &descriptor.traits {
        properties.set(&t.name, &t.value);
    }
    for category in &descriptor.categories {
        properties.add_category(category);
    }

    TraceRecord {
        message: format!("Discovered test {}", descriptor.display_name),
        severity: Severity::Verbose,
        timestamp: Utc::now(),
        properties,
    }
}

/// One-shot summary trace for the end of a discovery pass
pub fn discovery_summary_trace(payload: &DiscoveryCompletePayload) -> TraceRecord {
    let message = if payload.aborted {
        format!(
            "Discovery aborted after {} test(s)",
            payload.total_discovered
        )
    } else {
        format!("Discovery complete: {} test(s)", payload.total_discovered)
    };
    TraceRecord::message(message, Severity::Verbose)
}
