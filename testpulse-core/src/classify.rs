//! Outcome classification
//!
//! Maps the runner's outcome domain onto the categorical response codes the
//! telemetry backend groups by. Request-shaped records borrow HTTP response
//! codes as the grouping key, so a failed test reads like a 500.

use crate::harness::types::TestOutcome;

/// Categorical response code for a test outcome.
///
/// Total over the outcome domain: every outcome has a code.
pub fn response_code(outcome: TestOutcome) -> &'static str {
    match outcome {
        TestOutcome::Passed => "200",
        TestOutcome::Failed => "500",
        TestOutcome::Skipped => "404",
        TestOutcome::Other => "400",
    }
}

/// A test counts as successful only when it passed.
pub fn is_success(outcome: TestOutcome) -> bool {
    outcome == TestOutcome::Passed
}
