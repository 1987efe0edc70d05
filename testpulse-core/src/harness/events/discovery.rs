//! Discovery event payloads
//!
//! A discovery pass walks the test binaries and reports the cases it finds,
//! batched, followed by a single completion event with totals.

use serde::{Deserialize, Serialize};

use super::TestCaseDescriptor;

/// A batch of discovered test cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestsDiscoveredPayload {
    /// Descriptors in the order the runner reported them
    pub test_cases: Vec<TestCaseDescriptor>,
}

/// End of a discovery pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryCompletePayload {
    /// Total number of test cases found across all batches
    #[serde(default)]
    pub total_discovered: u64,

    /// Whether discovery was aborted before completing
    #[serde(default)]
    pub aborted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_complete_defaults() {
        let payload: DiscoveryCompletePayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.total_discovered, 0);
        assert!(!payload.aborted);
    }
}
