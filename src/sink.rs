//! Logging sinks that receive deprecation messages.

use thiserror::Error;

/// Failure reported by a sink while emitting a message.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink rejected message: {0}")]
    Rejected(String),
    #[error("sink I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// A destination for informational log lines.
///
/// Any `Fn(&str) + Send + Sync` closure is a sink that never fails.
pub trait LogSink: Send + Sync {
    /// Emits `message` at informational severity.
    fn info(&self, message: &str) -> Result<(), SinkError>;
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn info(&self, message: &str) -> Result<(), SinkError> {
        self(message);
        Ok(())
    }
}

/// Forwards messages to `tracing` at `INFO` level under the `deprecation` target.
///
/// ```
/// use deprecation_reporter::{Reporter, TracingSink};
///
/// let reporter = Reporter::new();
/// reporter.set_logger(TracingSink);
/// assert!(reporter.has_logger());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) -> Result<(), SinkError> {
        tracing::info!(target: "deprecation", "{message}");
        Ok(())
    }
}
