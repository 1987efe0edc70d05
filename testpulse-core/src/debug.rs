//! Verbose local diagnostics
//!
//! Mirrors key mapping decisions (which test is being mapped, which traits
//! and categories were found, discovery counts) to stderr when the `Debug`
//! parameter is set. Purely observational: nothing here touches what gets
//! submitted to the sink, and the disabled path does no work.

use std::sync::{Arc, Mutex};

/// Local diagnostic channel, gated by the `Debug` configuration flag
///
/// Lines go to stderr by default; [`DebugTrace::captured`] collects them
/// into a shared buffer instead so callers can inspect what was emitted.
#[derive(Debug, Clone, Default)]
pub struct DebugTrace {
    enabled: bool,
    capture: Option<Arc<Mutex<Vec<String>>>>,
}

impl DebugTrace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            capture: None,
        }
    }

    /// A channel that collects lines into a buffer instead of printing them
    pub fn captured(enabled: bool) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                enabled,
                capture: Some(Arc::clone(&buffer)),
            },
            buffer,
        )
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Emit one diagnostic line when enabled.
    ///
    /// Writes to stderr: stdout belongs to the host runner.
    pub fn line(&self, message: impl AsRef<str>) {
        if self.enabled {
            self.emit(message.as_ref());
        }
    }

    /// Emit a lazily-built diagnostic line; the closure only runs when
    /// diagnostics are enabled.
    pub fn line_with(&self, build: impl FnOnce() -> String) {
        if self.enabled {
            self.emit(&build());
        }
    }

    fn emit(&self, message: &str) {
        match &self.capture {
            Some(buffer) => {
                let mut lines = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                lines.push(message.to_string());
            }
            None => eprintln!("[testpulse] {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_trace_never_builds_the_message() {
        let trace = DebugTrace::new(false);
        let mut built = false;
        trace.line_with(|| {
            built = true;
            String::new()
        });
        assert!(!built);
    }

    #[test]
    fn test_enabled_trace_builds_the_message() {
        let trace = DebugTrace::new(true);
        let mut built = false;
        trace.line_with(|| {
            built = true;
            "diagnostic".into()
        });
        assert!(built);
    }

    #[test]
    fn test_captured_trace_collects_lines() {
        let (trace, lines) = DebugTrace::captured(true);
        trace.line("first");
        trace.line_with(|| "second".into());

        let lines = lines.lock().unwrap();
        assert_eq!(*lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_captured_trace_stays_gated() {
        let (trace, lines) = DebugTrace::captured(false);
        trace.line("suppressed");
        assert!(lines.lock().unwrap().is_empty());
    }
}
