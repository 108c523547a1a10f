//! # Deprecation Reporter
//!
//! Logs one informational line the first time each deprecated call site runs,
//! naming the deprecated code and its caller:
//!
//! ```text
//! Deprecated call to src/legacy.rs:12 -> old_fn from src/main.rs:40
//! ```
//!
//! Repeats of the same message are suppressed, so hot deprecated paths do not
//! flood the log. Messages go to an injected [`LogSink`]; without one,
//! reporting does nothing.
//!
//! ## Quick Start
//!
//! ```rust
//! use deprecation_reporter::{Reporter, TracingSink};
//!
//! let reporter = Reporter::global();
//! reporter.set_logger(TracingSink);
//!
//! fn old_api(reporter: &Reporter) -> u32 {
//!     let _ = reporter.report(Some("use new_api"));
//!     7
//! }
//!
//! for _ in 0..3 {
//!     old_api(&reporter);
//! }
//! assert_eq!(reporter.seen_count(), 1);
//! ```
//!
//! ## Pieces
//!
//! - [`Reporter`] - deduplicating reporter; [`Reporter::report`] walks the stack,
//!   [`Reporter::report_frames`] and [`deprecated!`] take explicit call sites
//! - [`registry`] - process-wide single-instance registry behind [`Reporter::global`]
//! - [`define_registry!`] - isolated registries with the same surface
//! - [`StackSource`] - how call stacks are obtained ([`BacktraceStack`], [`FixedStack`])
//! - [`LogSink`] - where messages go ([`TracingSink`] or any `Fn(&str)`)

pub mod call_site;
mod macros;
pub mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;
mod reporter;
pub mod sink;
pub mod stack;

pub use call_site::{CallSiteInfo, UNDEFINED};
pub use registry_error::RegistryError;
pub use registry_event::RegistryEvent;
pub use registry_trait::{RegistryApi, Storage, TraceCallback, TraceSlot};
pub use reporter::{Reporter, DEFAULT_STACK_DEPTH, ENTRY_POINT};
pub use sink::{LogSink, SinkError, TracingSink};
pub use stack::{BacktraceStack, FixedStack, StackFrame, StackSource};
