//! Failure reporting hook.
//!
//! Every binding or invocation failure funnels through exactly one
//! registered hook before the failing operation returns its absent
//! result. Nothing is thrown across the runtime's public boundary.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::BindError;

/// Consumer-registered failure sink.
pub trait FailureHook: Send + Sync {
    /// Called once per failed binding or invocation.
    fn on_failure(&self, error: &BindError);

    /// Called for failures that carry only a message.
    fn on_message(&self, message: &str) {
        let _ = message;
    }
}

/// Hook that drops every report. Useful when a caller only cares about
/// the absent results.
#[derive(Debug, Default)]
pub struct SilentHook;

impl FailureHook for SilentHook {
    fn on_failure(&self, _error: &BindError) {}
}

/// Hook that records every report, in order.
///
/// Primarily for tests and diagnostics surfaces that show the user why a
/// feature came up unavailable.
#[derive(Debug, Default)]
pub struct RecordingHook {
    failures: Mutex<Vec<BindError>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingHook {
    /// New empty recording hook.
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingHook::default())
    }

    /// Number of failures reported so far.
    pub fn failure_count(&self) -> usize {
        self.failures.lock().len()
    }

    /// Snapshot of reported failures.
    pub fn failures(&self) -> Vec<BindError> {
        self.failures.lock().clone()
    }

    /// Snapshot of reported plain messages.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl FailureHook for RecordingHook {
    fn on_failure(&self, error: &BindError) {
        self.failures.lock().push(error.clone());
    }

    fn on_message(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_hook_keeps_order() {
        let hook = RecordingHook::new();
        hook.on_failure(&BindError::ClassNotFound {
            class: "A".to_string(),
        });
        hook.on_failure(&BindError::InvocationFailed("boom".to_string()));
        hook.on_message("plain");

        let failures = hook.failures();
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures[0], BindError::ClassNotFound { .. }));
        assert!(matches!(failures[1], BindError::InvocationFailed(_)));
        assert_eq!(hook.messages(), vec!["plain".to_string()]);
    }
}
