//! User-facing error reporting.

use tracing::warn;

/// Shows an error message to the user. Fire-and-forget.
pub trait ErrorReporter: Send + Sync {
    /// Reports `message`.
    fn report_error(&self, message: &str);
}

/// [`ErrorReporter`] that logs at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report_error(&self, message: &str) {
        warn!(target: "minigate::report", "{message}");
    }
}

/// [`ErrorReporter`] that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ErrorReporter for SilentReporter {
    fn report_error(&self, _message: &str) {}
}
