//! Host runner harness
//!
//! The harness is the boundary with the test-execution engine. It parses
//! the runner's lifecycle events and hands them to a [`RunObserver`] - the
//! capability through which the rest of the plugin receives callbacks.
//! The harness itself is a pure translator: no telemetry, no state.

pub mod events;
pub mod types;

use anyhow::Result;
use events::RunnerEvent;

/// The RunnerHarness - a pure translator for host runner events
pub struct RunnerHarness;

impl RunnerHarness {
    /// Parse one raw lifecycle event
    pub fn parse_event(input: &str) -> Result<RunnerEvent> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Lifecycle callbacks a telemetry plugin registers with the host runner.
///
/// Handlers are invoked sequentially on the runner's dispatch thread and
/// must never propagate a failure back into the runner: one bad result
/// must not abort telemetry for the rest of the run.
pub trait RunObserver {
    /// A discovery pass finished
    fn on_discovery_complete(&mut self, payload: &events::DiscoveryCompletePayload);

    /// A batch of test cases was discovered
    fn on_tests_discovered(&mut self, test_cases: &[events::TestCaseDescriptor]);

    /// One test case finished executing
    fn on_test_result(&mut self, payload: &events::TestResultPayload);

    /// The run finished; flush and go quiet
    fn on_run_complete(&mut self);
}

/// Route one parsed event to the matching observer callback
pub fn dispatch(observer: &mut dyn RunObserver, event: &RunnerEvent) {
    match event {
        RunnerEvent::TestsDiscovered(payload) => observer.on_tests_discovered(&payload.test_cases),
        RunnerEvent::DiscoveryComplete(payload) => observer.on_discovery_complete(payload),
        RunnerEvent::TestResult(payload) => observer.on_test_result(payload),
        RunnerEvent::RunComplete(_) => observer.on_run_complete(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::{DiscoveryCompletePayload, TestCaseDescriptor, TestResultPayload};

    #[derive(Default)]
    struct CountingObserver {
        discovered: usize,
        discovery_complete: usize,
        results: usize,
        completed: usize,
    }

    impl RunObserver for CountingObserver {
        fn on_discovery_complete(&mut self, _payload: &DiscoveryCompletePayload) {
            self.discovery_complete += 1;
        }

        fn on_tests_discovered(&mut self, test_cases: &[TestCaseDescriptor]) {
            self.discovered += test_cases.len();
        }

        fn on_test_result(&mut self, _payload: &TestResultPayload) {
            self.results += 1;
        }

        fn on_run_complete(&mut self) {
            self.completed += 1;
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RunnerHarness::parse_event("not json").is_err());
        assert!(RunnerHarness::parse_event(r#"{"event_name": "Bogus"}"#).is_err());
    }

    #[test]
    fn test_dispatch_routes_each_event() {
        let mut observer = CountingObserver::default();

        let events = [
            r#"{"event_name": "TestsDiscovered", "test_cases": [
                {"display_name": "A", "fully_qualified_name": "S.A", "id": "1"},
                {"display_name": "B", "fully_qualified_name": "S.B", "id": "2"}
            ]}"#,
            r#"{"event_name": "DiscoveryComplete", "total_discovered": 2}"#,
            r#"{"event_name": "TestResult", "test_case":
                {"display_name": "A", "fully_qualified_name": "S.A", "id": "1"},
                "outcome": "Passed", "started_at": "2026-01-05T12:00:00Z"}"#,
            r#"{"event_name": "RunComplete"}"#,
        ];

        for raw in events {
            let event = RunnerHarness::parse_event(raw).unwrap();
            dispatch(&mut observer, &event);
        }

        assert_eq!(observer.discovered, 2);
        assert_eq!(observer.discovery_complete, 1);
        assert_eq!(observer.results, 1);
        assert_eq!(observer.completed, 1);
    }
}
