//! Test result event payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TestCaseDescriptor;
use crate::harness::types::TestOutcome;

/// One completed test case.
///
/// Consumed immediately into a telemetry record; nothing here outlives the
/// handler call that receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultPayload {
    /// The test case this result belongs to
    pub test_case: TestCaseDescriptor,

    /// How the test finished
    pub outcome: TestOutcome,

    /// When the test started executing
    pub started_at: DateTime<Utc>,

    /// Wall-clock execution time in milliseconds
    #[serde(default)]
    pub duration_ms: u64,

    /// Failure message, present only for failed outcomes
    #[serde(default)]
    pub error_message: Option<String>,

    /// Stack trace at the point of failure, present only for failed outcomes
    #[serde(default)]
    pub error_stack_trace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_result_parses_without_error_fields() {
        let json = r#"{
            "test_case": {
                "display_name": "ShouldAdd",
                "fully_qualified_name": "Calc.Tests.ShouldAdd",
                "id": "case-1"
            },
            "outcome": "Passed",
            "started_at": "2026-01-05T12:00:00Z",
            "duration_ms": 10
        }"#;
        let payload: TestResultPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.outcome, TestOutcome::Passed);
        assert!(payload.error_message.is_none());
        assert!(payload.error_stack_trace.is_none());
    }
}
