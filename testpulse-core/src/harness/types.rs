//! Harness type definitions
//!
//! This module defines the outcome domain reported by the host test runner.
//! The runner owns the outcome semantics; Testpulse only consumes them, so
//! the enum is deliberately tolerant of outcome values it has never seen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a completed test case, as reported by the host runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestOutcome {
    /// The test ran to completion and all assertions held
    Passed,

    /// The test ran and at least one assertion or invariant failed
    Failed,

    /// The test was skipped (filtered out, explicitly ignored, ...)
    Skipped,

    /// Any outcome the runner reports that is none of the above
    /// (aborted, not found, in-progress at shutdown)
    #[serde(other)]
    Other,
}

impl TestOutcome {
    /// Get the outcome name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TestOutcome::Passed => "Passed",
            TestOutcome::Failed => "Failed",
            TestOutcome::Skipped => "Skipped",
            TestOutcome::Other => "Other",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TestOutcome {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Mirrors deserialization: anything unrecognized folds into Other
        // instead of rejecting the value.
        Ok(match s.to_lowercase().as_str() {
            "passed" => TestOutcome::Passed,
            "failed" => TestOutcome::Failed,
            "skipped" => TestOutcome::Skipped,
            _ => TestOutcome::Other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(TestOutcome::Passed.to_string(), "Passed");
        assert_eq!(TestOutcome::Failed.to_string(), "Failed");
        assert_eq!(TestOutcome::Skipped.to_string(), "Skipped");
        assert_eq!(TestOutcome::Other.to_string(), "Other");
    }

    #[test]
    fn test_outcome_deserializes_known_values() {
        let outcome: TestOutcome = serde_json::from_str("\"Passed\"").unwrap();
        assert_eq!(outcome, TestOutcome::Passed);
        let outcome: TestOutcome = serde_json::from_str("\"Skipped\"").unwrap();
        assert_eq!(outcome, TestOutcome::Skipped);
    }

    #[test]
    fn test_outcome_from_str_is_case_insensitive_and_total() {
        assert_eq!("Passed".parse(), Ok(TestOutcome::Passed));
        assert_eq!("FAILED".parse(), Ok(TestOutcome::Failed));
        assert_eq!("skipped".parse(), Ok(TestOutcome::Skipped));
        assert_eq!("NotFound".parse(), Ok(TestOutcome::Other));
    }

    #[test]
    fn test_outcome_unknown_values_fold_into_other() {
        // Runners report outcomes this plugin has never heard of; all of
        // them classify as Other rather than failing the whole event.
        let outcome: TestOutcome = serde_json::from_str("\"NotFound\"").unwrap();
        assert_eq!(outcome, TestOutcome::Other);
        let outcome: TestOutcome = serde_json::from_str("\"None\"").unwrap();
        assert_eq!(outcome, TestOutcome::Other);
    }
}
