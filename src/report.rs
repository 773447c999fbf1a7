//! Failure reporting seam
//!
//! The host environment (a media-center plugin runtime in the original
//! deployment) surfaces fetch failures to the user through its own
//! notification mechanism. That side effect is modeled here as a small
//! trait so the orchestrator can fire one-line messages without knowing
//! about any host UI, and tests can capture them instead.

use std::sync::Mutex;

/// Fire-and-forget sink for one-line failure notifications
///
/// Implementations must never block or fail; reporting is purely a side
/// channel and has no effect on control flow.
pub trait Reporter: Send + Sync {
    /// Surfaces a human-readable failure message
    fn notify(&self, message: &str);
}

/// Default reporter that routes notifications through `tracing`
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn notify(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Reporter that records every message, for assertions in tests
#[derive(Debug, Default)]
pub struct CapturingReporter {
    messages: Mutex<Vec<String>>,
}

impl CapturingReporter {
    /// Returns a copy of every message reported so far
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl Reporter for CapturingReporter {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
