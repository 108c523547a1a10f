//! The process-wide single-instance registry.
//!
//! Each type gets at most one lazily built instance, shared as `Arc<T>`:
//!
//! ```
//! use deprecation_reporter::registry;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Settings {
//!     verbose: bool,
//! }
//!
//! let first: Arc<Settings> = registry::instance();
//! let second: Arc<Settings> = registry::instance();
//! assert!(Arc::ptr_eq(&first, &second));
//! assert!(!second.verbose);
//! ```
//!
//! Isolated registries with the same surface are created with
//! [`define_registry!`](crate::define_registry).

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex},
};

use crate::registry_trait::{RegistryApi, Storage, TraceSlot};
use crate::{RegistryError, RegistryEvent};

/// Global thread-safe storage, keyed by `TypeId`.
static GLOBAL_REGISTRY: Storage = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Holds an optional user-defined tracing callback.
static TRACE_CALLBACK: TraceSlot = LazyLock::new(|| Mutex::new(None));

struct Global;

impl RegistryApi for Global {
    fn storage() -> &'static Storage {
        &GLOBAL_REGISTRY
    }

    fn trace() -> &'static TraceSlot {
        &TRACE_CALLBACK
    }
}

const GLOBAL: Global = Global;

/// Sets a tracing callback that will be invoked on every registry interaction.
///
/// # Example
/// ```rust
/// use deprecation_reporter::registry;
///
/// registry::set_trace_callback(|event| println!("[registry-trace] {event}"));
/// # registry::clear_trace_callback();
/// ```
pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
    GLOBAL.set_trace_callback(callback)
}

/// Clears the tracing callback (disables registry tracing).
pub fn clear_trace_callback() {
    GLOBAL.clear_trace_callback()
}

/// Returns the process-wide instance of `T`, building it with `T::default()` on first use.
pub fn instance<T: Default + Send + Sync + 'static>() -> Arc<T> {
    GLOBAL.instance()
}

/// Returns the process-wide instance of `T`, building it with `init` on first use.
///
/// # Errors
///
/// Errors from `init` are returned unchanged and nothing is stored.
///
/// # Examples
///
/// ```
/// use deprecation_reporter::registry;
/// use std::sync::Arc;
///
/// struct Port(u16);
///
/// let failed: Result<Arc<Port>, String> = registry::try_instance(|| Err("no port".into()));
/// assert!(failed.is_err());
///
/// let port = registry::try_instance(|| Ok::<_, String>(Port(8080))).unwrap();
/// assert_eq!(port.0, 8080);
/// ```
pub fn try_instance<T, E>(init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E>
where
    T: Send + Sync + 'static,
{
    GLOBAL.try_instance(init)
}

/// Retrieves the stored instance of `T` without constructing one.
///
/// # Errors
///
/// `RegistryError::TypeNotFound` when no instance of `T` exists yet.
pub fn get<T: Send + Sync + 'static>() -> Result<Arc<T>, RegistryError> {
    GLOBAL.get()
}

/// Checks whether an instance of `T` is stored.
pub fn contains<T: Send + Sync + 'static>() -> Result<bool, RegistryError> {
    GLOBAL.contains::<T>()
}

/// Warns when a `T` is built while an instance is already stored.
///
/// Call from the public constructor of a singleton type. Returns `true` when
/// the warning fired.
pub fn note_construction<T: 'static>() -> bool {
    GLOBAL.note_construction::<T>()
}

#[doc(hidden)]
pub fn clear() {
    GLOBAL.clear()
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
