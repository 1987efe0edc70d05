//! Run completion event payload

use serde::{Deserialize, Serialize};

/// The run finished. After this event the runner emits nothing further,
/// so it is the trigger for the final telemetry flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunCompletePayload {
    /// Whether the run was aborted before all tests executed
    #[serde(default)]
    pub aborted: bool,

    /// Runner-level error text, if the run itself failed
    #[serde(default)]
    pub error: Option<String>,
}
