use serde::{Deserialize, Serialize};

mod discovery;
mod run_complete;
mod test_result;

pub use discovery::{DiscoveryCompletePayload, TestsDiscoveredPayload};
pub use run_complete::RunCompletePayload;
pub use test_result::TestResultPayload;

/// A name/value annotation the host framework attaches to a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub name: String,
    pub value: String,
}

impl Trait {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A test case as described by the host runner.
///
/// This is an external entity: the runner owns every field and Testpulse
/// never mutates it. Trait and category order is the runner's declared
/// order and is preserved through to the telemetry property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseDescriptor {
    /// Human-readable name, typically the bare method name
    pub display_name: String,

    /// Dotted path including the containing class/module
    pub fully_qualified_name: String,

    /// Stable identifier assigned by the runner
    pub id: String,

    /// Name/value trait pairs in declared order
    #[serde(default)]
    pub traits: Vec<Trait>,

    /// Category labels in declared order ("TestCategory" values)
    #[serde(default)]
    pub categories: Vec<String>,
}

/// All lifecycle events the host runner emits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "PascalCase")]
pub enum RunnerEvent {
    /// A batch of test cases found during a discovery pass
    TestsDiscovered(TestsDiscoveredPayload),

    /// Discovery pass finished
    DiscoveryComplete(DiscoveryCompletePayload),

    /// One test case finished executing
    TestResult(TestResultPayload),

    /// The whole run finished; no further results will arrive
    RunComplete(RunCompletePayload),
}

impl RunnerEvent {
    /// Get the event name for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            RunnerEvent::TestsDiscovered(_) => "TestsDiscovered",
            RunnerEvent::DiscoveryComplete(_) => "DiscoveryComplete",
            RunnerEvent::TestResult(_) => "TestResult",
            RunnerEvent::RunComplete(_) => "RunComplete",
        }
    }
}
