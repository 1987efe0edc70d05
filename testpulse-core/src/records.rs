//! Telemetry record types
//!
//! The three record shapes the mapper produces, plus the ordered property
//! bag they all carry. Records are plain data: building one performs no IO
//! and cannot fail. Submission is the sink's problem.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Reserved property key under which category labels accumulate
pub const TEST_CATEGORY_KEY: &str = "TestCategory";

// ============================================================================
// Property Bag
// ============================================================================

/// A property value: a single string, or an ordered collection for keys
/// that legitimately repeat (category labels).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(String),
    Many(Vec<String>),
}

/// Insertion-ordered string properties attached to a telemetry record.
///
/// Keys are unique. Re-setting a key replaces its value in place, keeping
/// the original position, so the bag's order is deterministic regardless of
/// collisions between trait names and reserved keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued property. Last write wins on collision.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = PropertyValue::Single(value.into());
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Set a property only when a value is present; `None` is omitted.
    pub fn set_optional(&mut self, key: impl Into<String>, value: Option<&str>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Append a category label. All labels collect under one
    /// [`TEST_CATEGORY_KEY`] entry as a multi-value property.
    pub fn add_category(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k == TEST_CATEGORY_KEY)
        {
            Some((_, PropertyValue::Many(values))) => values.push(value),
            Some(entry) => entry.1 = PropertyValue::Many(vec![value]),
            None => self
                .entries
                .push((TEST_CATEGORY_KEY.into(), PropertyValue::Many(vec![value]))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes as a JSON object, preserving insertion order.
impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Severity
// ============================================================================

/// Severity levels understood by the telemetry backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Verbose,
    Information,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Verbose => "Verbose",
            Severity::Information => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Records
// ============================================================================

/// Request-shaped record: one per completed test case.
///
/// The correlation id is the run id, shared by every record of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    /// Run-wide correlation identifier
    pub correlation_id: String,

    /// Test display name
    pub name: String,

    /// True only for passed outcomes
    pub success: bool,

    /// Test execution time in milliseconds
    pub duration_ms: u64,

    /// Logical source: the containing class/module name
    pub source: String,

    /// When the test started
    pub timestamp: DateTime<Utc>,

    /// Classifier output for the outcome
    pub response_code: String,

    pub properties: PropertyBag,
}

/// Exception-shaped record: emitted only for failed outcomes, linked to its
/// request record by correlation id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionRecord {
    /// Same correlation id as the request record it belongs to
    pub correlation_id: String,

    /// Same timestamp as the request record it belongs to
    pub timestamp: DateTime<Utc>,

    /// Backend grouping key: the failure message
    pub problem_id: String,

    /// Detail message: the stack trace
    pub message: String,

    /// Display name of the failing test
    pub source: String,

    /// Always [`Severity::Critical`] for test failures
    pub severity: Severity,
}

/// Trace-shaped record: discovery traces and run lifecycle markers.
///
/// Discovery traces carry no correlation id: discovery may run outside any
/// run context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub properties: PropertyBag,
}

impl TraceRecord {
    /// A trace with no properties, stamped now
    pub fn message(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            timestamp: Utc::now(),
            properties: PropertyBag::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_preserves_insertion_order() {
        let mut bag = PropertyBag::new();
        bag.set("TestCaseId", "1");
        bag.set("Owner", "infra");
        bag.set("Priority", "2");

        let keys: Vec<_> = bag.keys().collect();
        assert_eq!(keys, vec!["TestCaseId", "Owner", "Priority"]);
    }

    #[test]
    fn test_collision_is_last_write_wins_in_place() {
        let mut bag = PropertyBag::new();
        bag.set("ErrorMessage", "boom");
        bag.set("Owner", "infra");
        // A trait named like a reserved key overwrites the reserved entry
        // but keeps its original position.
        bag.set("ErrorMessage", "trait value");

        let keys: Vec<_> = bag.keys().collect();
        assert_eq!(keys, vec!["ErrorMessage", "Owner"]);
        assert_eq!(
            bag.get("ErrorMessage"),
            Some(&PropertyValue::Single("trait value".into()))
        );
    }

    #[test]
    fn test_set_optional_omits_none() {
        let mut bag = PropertyBag::new();
        bag.set_optional("BuildId", Some("7231"));
        bag.set_optional("BuildNumber", None);

        assert_eq!(bag.len(), 1);
        assert!(bag.get("BuildNumber").is_none());
    }

    #[test]
    fn test_categories_collect_under_one_key() {
        let mut bag = PropertyBag::new();
        bag.add_category("Smoke");
        bag.add_category("Nightly");

        assert_eq!(bag.len(), 1);
        assert_eq!(
            bag.get(TEST_CATEGORY_KEY),
            Some(&PropertyValue::Many(vec!["Smoke".into(), "Nightly".into()]))
        );
    }

    #[test]
    fn test_bag_serializes_as_ordered_object() {
        let mut bag = PropertyBag::new();
        bag.set("TestCaseId", "1");
        bag.add_category("Smoke");
        bag.add_category("Nightly");

        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(
            json,
            r#"{"TestCaseId":"1","TestCategory":["Smoke","Nightly"]}"#
        );
    }

    #[test]
    fn test_severity_display_matches_backend_names() {
        assert_eq!(Severity::Critical.to_string(), "Critical");
        assert_eq!(Severity::Information.to_string(), "Information");
    }
}
