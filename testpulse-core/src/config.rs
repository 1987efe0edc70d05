//! Plugin configuration
//!
//! The host hands the plugin a flat string-to-string parameter map at
//! activation time. Telemetry is opt-in: without a connection string the
//! plugin stays inert for the whole run. Nothing in here is fatal - a
//! malformed flag degrades to its default.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Parameter key carrying the ingestion endpoint connection string
pub const CONNECTION_STRING_KEY: &str = "ApplicationInsightsConnectionString";

/// Parameter key enabling verbose local diagnostics
pub const DEBUG_KEY: &str = "Debug";

/// Parameter key overriding the bundled file sink's output directory
pub const TELEMETRY_DIR_KEY: &str = "TelemetryDir";

/// Default output directory for the bundled file sink
pub const DEFAULT_TELEMETRY_DIR: &str = ".testpulse/telemetry";

/// Parsed activation parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggerParams {
    /// Required to enable telemetry; absence means opt-out, not error
    pub connection_string: Option<String>,

    /// Verbose local diagnostics; malformed values parse as false
    pub debug: bool,

    /// Override for the bundled file sink's destination
    pub telemetry_dir: Option<PathBuf>,
}

impl LoggerParams {
    /// Parse the host's flat parameter map
    pub fn from_map(params: &BTreeMap<String, String>) -> Self {
        Self {
            connection_string: params
                .get(CONNECTION_STRING_KEY)
                .filter(|s| !s.trim().is_empty())
                .cloned(),
            debug: params.get(DEBUG_KEY).is_some_and(|v| parse_bool(v)),
            telemetry_dir: params.get(TELEMETRY_DIR_KEY).map(PathBuf::from),
        }
    }
}

/// Case-insensitive boolean parse; anything unparseable is false
fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_map_disables_everything() {
        let params = LoggerParams::from_map(&BTreeMap::new());
        assert!(params.connection_string.is_none());
        assert!(!params.debug);
        assert!(params.telemetry_dir.is_none());
    }

    #[test]
    fn test_connection_string_and_debug() {
        let params = LoggerParams::from_map(&map(&[
            (CONNECTION_STRING_KEY, "InstrumentationKey=abc"),
            (DEBUG_KEY, "true"),
        ]));
        assert_eq!(
            params.connection_string.as_deref(),
            Some("InstrumentationKey=abc")
        );
        assert!(params.debug);
    }

    #[test]
    fn test_blank_connection_string_is_absent() {
        let params = LoggerParams::from_map(&map(&[(CONNECTION_STRING_KEY, "   ")]));
        assert!(params.connection_string.is_none());
    }

    #[test]
    fn test_malformed_debug_flag_is_false() {
        for value in ["yes", "1", "debug", ""] {
            let params = LoggerParams::from_map(&map(&[(DEBUG_KEY, value)]));
            assert!(!params.debug, "{value:?} should parse as false");
        }
        // bool parsing is case-insensitive
        let params = LoggerParams::from_map(&map(&[(DEBUG_KEY, "True")]));
        assert!(params.debug);
    }
}
