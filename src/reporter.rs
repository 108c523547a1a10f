//! The deprecation reporter.
//!
//! Call [`Reporter::report`] at the top of a deprecated code path. The first
//! time a given call site (rendered as a message) is seen, one informational
//! line goes to the configured sink:
//!
//! ```text
//! Deprecated call to src/legacy.rs:12 -> old_fn from src/main.rs:40 (use new_fn)
//! ```
//!
//! Identical messages afterwards are suppressed for the life of the reporter.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::call_site::CallSiteInfo;
use crate::registry;
use crate::sink::{LogSink, SinkError};
use crate::stack::{BacktraceStack, StackFrame, StackSource};

/// Name of the reporter's entry point as it appears in captured frames.
pub const ENTRY_POINT: &str = "report";

/// Frames captured per report.
pub const DEFAULT_STACK_DEPTH: usize = 3;

/// Logs each unique deprecated call once.
///
/// Share a single reporter by reference or `Arc`, or use [`Reporter::global`]
/// for the process-wide instance.
pub struct Reporter {
    logger: RwLock<Option<Arc<dyn LogSink>>>,
    seen: Mutex<HashSet<String>>,
    stack: Box<dyn StackSource>,
}

impl Reporter {
    /// A reporter without a sink, walking the live stack.
    ///
    /// Building one while the process-wide instance exists logs a warning.
    pub fn new() -> Self {
        registry::note_construction::<Self>();
        Self {
            logger: RwLock::new(None),
            seen: Mutex::new(HashSet::new()),
            stack: Box::new(BacktraceStack),
        }
    }

    /// The process-wide reporter, built on first use.
    pub fn global() -> Arc<Self> {
        registry::instance::<Self>()
    }

    /// Replaces how call stacks are captured.
    pub fn with_stack_source(mut self, source: impl StackSource + 'static) -> Self {
        self.stack = Box::new(source);
        self
    }

    /// Sets the sink used by subsequent reports.
    pub fn set_logger(&self, sink: impl LogSink + 'static) -> &Self {
        self.set_shared_logger(Arc::new(sink))
    }

    /// Sets a sink that is shared with other owners.
    pub fn set_shared_logger(&self, sink: Arc<dyn LogSink>) -> &Self {
        *self.logger.write().unwrap_or_else(|p| p.into_inner()) = Some(sink);
        self
    }

    /// Removes the sink; reports become no-ops.
    pub fn clear_logger(&self) -> &Self {
        *self.logger.write().unwrap_or_else(|p| p.into_inner()) = None;
        self
    }

    /// Whether a sink is configured.
    pub fn has_logger(&self) -> bool {
        self.logger().is_some()
    }

    fn logger(&self) -> Option<Arc<dyn LogSink>> {
        self.logger
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Reports the deprecated function that called this one.
    ///
    /// Without a sink this returns immediately and does not inspect the stack.
    ///
    /// # Errors
    ///
    /// Sink failures are returned unchanged; the message is then not recorded
    /// as seen.
    #[inline(never)]
    pub fn report(&self, extra: Option<&str>) -> Result<&Self, SinkError> {
        let Some(logger) = self.logger() else {
            return Ok(self);
        };

        let frames = self.stack.capture(DEFAULT_STACK_DEPTH);
        let message = CallSiteInfo::from_frames(&frames, ENTRY_POINT).message(extra);
        self.emit_once(&*logger, message)?;

        Ok(self)
    }

    /// Reports a call site described by explicit frames, most recent first.
    ///
    /// # Errors
    ///
    /// Sink failures are returned unchanged.
    pub fn report_frames(
        &self,
        frames: &[StackFrame],
        extra: Option<&str>,
    ) -> Result<&Self, SinkError> {
        let Some(logger) = self.logger() else {
            return Ok(self);
        };

        let message = CallSiteInfo::from_frames(frames, ENTRY_POINT).message(extra);
        self.emit_once(&*logger, message)?;

        Ok(self)
    }

    /// Emits an already composed message unless it was seen before.
    ///
    /// Returns `true` when the message reached the sink.
    ///
    /// # Errors
    ///
    /// Sink failures are returned unchanged.
    pub fn report_message(&self, message: impl Into<String>) -> Result<bool, SinkError> {
        match self.logger() {
            Some(logger) => self.emit_once(&*logger, message.into()),
            None => Ok(false),
        }
    }

    /// The message is recorded before the sink runs and the lock is released
    /// during the call, so a sink may report through this reporter again.
    /// A failed emission is unrecorded afterwards.
    fn emit_once(&self, logger: &dyn LogSink, message: String) -> Result<bool, SinkError> {
        if !self.lock_seen().insert(message.clone()) {
            tracing::trace!(%message, "suppressed repeated deprecation message");
            return Ok(false);
        }

        if let Err(err) = logger.info(&message) {
            self.lock_seen().remove(&message);
            return Err(err);
        }
        Ok(true)
    }

    fn lock_seen(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Number of distinct messages emitted so far.
    pub fn seen_count(&self) -> usize {
        self.lock_seen().len()
    }

    /// Whether `message` was already emitted.
    pub fn has_seen(&self, message: &str) -> bool {
        self.lock_seen().contains(message)
    }

    #[cfg(test)]
    fn forget_seen(&self) {
        self.lock_seen().clear();
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("has_logger", &self.has_logger())
            .field("seen", &self.seen_count())
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
