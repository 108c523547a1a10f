//! Core trait defining registry behavior.
//!
//! This module provides the `RegistryApi` trait with default implementations for
//! construct-or-fetch access, lookup, and tracing of singleton instances.
//!
//! The registry is type-based: each type (`TypeId`) has at most one instance stored,
//! and once stored that instance is handed out for the rest of the registry's life.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, LazyLock, Mutex};

use crate::{RegistryError, RegistryEvent};

/// Type-erased instance storage backing a registry.
pub type Storage = LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It must be thread-safe because registries are globally shared.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Storage slot for the optional trace callback.
///
/// Note: `define_registry!` spells this type out in full. Keep both in sync.
pub type TraceSlot = LazyLock<Mutex<Option<Arc<TraceCallback>>>>;

/// Core trait defining registry behavior.
///
/// Provides default implementations for all registry operations, requiring only
/// two accessor methods (`storage` and `trace`) to be implemented by the implementor.
pub trait RegistryApi {
    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Access the trace callback static.
    fn trace() -> &'static TraceSlot;

    /// Set a tracing callback for registry operations.
    ///
    /// # Safety Restrictions
    ///
    /// The callback must NOT call any registry methods on the same registry,
    /// as this will cause a deadlock. The callback is invoked while holding
    /// the trace lock.
    fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    fn clear_trace_callback(&self) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Emit a registry event using the current callback, if any.
    ///
    /// Never called while the storage lock is held.
    fn emit_event(&self, event: &RegistryEvent) {
        let guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        if let Some(callback) = guard.as_ref() {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    /// Access the storage static.
    fn storage() -> &'static Storage;

    /// Returns the single instance of `T`, building it with `T::default()` on first use.
    ///
    /// Every call for the same `T` returns a handle to the same allocation.
    fn instance<T: Default + Send + Sync + 'static>(&self) -> Arc<T> {
        match self.try_instance(|| Ok::<T, Infallible>(T::default())) {
            Ok(instance) => instance,
            Err(never) => match never {},
        }
    }

    /// Returns the single instance of `T`, building it with `init` on first use.
    ///
    /// `init` runs without the storage lock held, so constructors may consult the
    /// registry. If two callers race, the first instance stored wins and the other
    /// freshly built value is dropped.
    ///
    /// # Errors
    ///
    /// Whatever `init` returns; nothing is stored in that case.
    fn try_instance<T, E, F>(&self, init: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let type_name = std::any::type_name::<T>();

        let existing = Self::storage()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|any_arc| any_arc.downcast::<T>().ok());

        self.emit_event(&RegistryEvent::Get {
            type_name,
            found: existing.is_some(),
        });

        if let Some(existing) = existing {
            return Ok(existing);
        }

        let fresh = Arc::new(init()?);

        let mut created = false;
        let stored = Self::storage()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                created = true;
                let erased: Arc<dyn Any + Send + Sync> = fresh.clone();
                erased
            })
            .clone();

        if created {
            self.emit_event(&RegistryEvent::Construct { type_name });
        }

        Ok(stored.downcast::<T>().unwrap_or(fresh))
    }

    /// Retrieve an already stored instance without constructing one.
    ///
    /// # Errors
    ///
    /// - Type `T` is not found in the registry
    /// - Type mismatch (extremely rare)
    /// - Registry lock is poisoned
    fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        let map = Self::storage()
            .lock()
            .map_err(|_| RegistryError::RegistryLock)?;

        let any_arc_opt = map.get(&TypeId::of::<T>()).cloned();

        drop(map);

        let result: Result<Arc<T>, RegistryError> = match any_arc_opt {
            Some(any_arc) => any_arc
                .downcast::<T>()
                .map_err(|_| RegistryError::TypeMismatch {
                    type_name: std::any::type_name::<T>(),
                }),
            None => Err(RegistryError::TypeNotFound {
                type_name: std::any::type_name::<T>(),
            }),
        };

        self.emit_event(&RegistryEvent::Get {
            type_name: std::any::type_name::<T>(),
            found: result.is_ok(),
        });

        result
    }

    /// Check if a type is registered in the registry.
    ///
    /// # Errors
    ///
    /// - Registry lock is poisoned
    fn contains<T: Send + Sync + 'static>(&self) -> Result<bool, RegistryError> {
        let found = Self::storage()
            .lock()
            .map(|m| m.contains_key(&TypeId::of::<T>()))
            .map_err(|_| RegistryError::RegistryLock)?;

        self.emit_event(&RegistryEvent::Contains {
            type_name: std::any::type_name::<T>(),
            found,
        });

        Ok(found)
    }

    /// Records that a `T` is being built outside the registry.
    ///
    /// Singleton types call this from their public constructor. When an instance of
    /// `T` is already stored, a warning is logged and a `DuplicateConstruction` event
    /// is emitted; construction itself is never blocked and storage is untouched.
    ///
    /// Returns `true` when the warning fired.
    fn note_construction<T: 'static>(&self) -> bool {
        let registered = Self::storage()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(&TypeId::of::<T>());

        if registered {
            let type_name = std::any::type_name::<T>();
            tracing::warn!(type_name, "tried to construct a second instance of a registered singleton");
            self.emit_event(&RegistryEvent::DuplicateConstruction { type_name });
        }

        registered
    }

    /// Clear all stored instances.
    ///
    /// Intended for tests. Already handed-out `Arc<T>` handles stay valid, and the
    /// tracing callback is left in place.
    #[doc(hidden)]
    fn clear(&self) {
        self.emit_event(&RegistryEvent::Clear {});

        if let Ok(mut registry) = Self::storage().lock() {
            registry.clear();
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::RegistryError;

    use super::{RegistryApi, Storage, TraceSlot};

    use serial_test::serial;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, LazyLock, Mutex};

    static STORAGE: Storage = LazyLock::new(|| Mutex::new(HashMap::new()));

    static TRACE: TraceSlot = LazyLock::new(|| Mutex::new(None));

    struct Api;

    impl RegistryApi for Api {
        fn storage() -> &'static Storage {
            &STORAGE
        }

        fn trace() -> &'static TraceSlot {
            &TRACE
        }
    }

    const API: Api = Api;

    fn record_events() -> Arc<Mutex<Vec<String>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        API.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(format!("{}", e));
        });
        events
    }

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
    }

    #[test]
    #[serial]
    fn test_instance_is_constructed_once() {
        API.clear();

        let first: Arc<Counter> = API.instance();
        first.hits.fetch_add(1, Ordering::SeqCst);

        let second: Arc<Counter> = API.instance();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.hits.load(Ordering::SeqCst), 1);

        API.clear();
    }

    #[test]
    #[serial]
    fn test_instance_per_type() {
        API.clear();

        #[derive(Default)]
        struct Left(u8);
        #[derive(Default)]
        struct Right(u8);

        let left: Arc<Left> = API.instance();
        let right: Arc<Right> = API.instance();
        assert_eq!(left.0, right.0);
        assert!(API.contains::<Left>().unwrap());
        assert!(API.contains::<Right>().unwrap());
        assert!(!API.contains::<Counter>().unwrap());

        API.clear();
    }

    #[test]
    #[serial]
    fn test_try_instance_propagates_error() {
        API.clear();

        let result: Result<Arc<String>, &str> = API.try_instance(|| Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
        assert!(!API.contains::<String>().unwrap());

        let ok: Arc<String> = API
            .try_instance(|| Ok::<_, &str>("ready".to_string()))
            .unwrap();
        assert_eq!(&*ok, "ready");

        // Stored instance wins over a later initializer.
        let again: Arc<String> = API
            .try_instance(|| Ok::<_, &str>("ignored".to_string()))
            .unwrap();
        assert!(Arc::ptr_eq(&ok, &again));
    }

    #[test]
    #[serial]
    fn test_get_nonexistent() {
        API.clear();

        let result: Result<Arc<String>, RegistryError> = API.get();
        assert_eq!(
            result.unwrap_err(),
            RegistryError::TypeNotFound {
                type_name: "alloc::string::String"
            }
        );
    }

    #[test]
    #[serial]
    fn test_get_after_instance() {
        API.clear();

        let built: Arc<u64> = API.instance();
        let fetched: Arc<u64> = API.get().unwrap();
        assert!(Arc::ptr_eq(&built, &fetched));
    }

    #[test]
    #[serial]
    fn test_thread_safety() {
        API.clear();

        use std::sync::Barrier;
        use std::thread;

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    API.instance::<Counter>()
                })
            })
            .collect();

        let instances: Vec<Arc<Counter>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for other in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], other));
        }

        API.clear();
    }

    #[test]
    #[serial]
    fn test_constructor_may_consult_registry() {
        API.clear();

        struct Probe {
            saw_itself: bool,
        }

        impl Default for Probe {
            fn default() -> Self {
                Self {
                    saw_itself: API.note_construction::<Probe>(),
                }
            }
        }

        let probe: Arc<Probe> = API.instance();
        assert!(!probe.saw_itself);

        let direct = Probe::default();
        assert!(direct.saw_itself);

        // The stored instance is unaffected by the direct construction.
        let again: Arc<Probe> = API.instance();
        assert!(Arc::ptr_eq(&probe, &again));
    }

    #[test]
    #[serial]
    fn test_trace_instance_events() {
        API.clear();
        let events = record_events();

        let _: Arc<i32> = API.instance();
        let _: Arc<i32> = API.instance();

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "get { type_name: i32, found: false }".to_string(),
                "construct { type_name: i32 }".to_string(),
                "get { type_name: i32, found: true }".to_string(),
            ]
        );
        drop(captured);

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_trace_duplicate_construction_event() {
        API.clear();
        let _: Arc<u16> = API.instance();
        let events = record_events();

        assert!(API.note_construction::<u16>());
        assert!(!API.note_construction::<u32>());

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec!["duplicate construction { type_name: u16 }".to_string()]
        );
        drop(captured);

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_trace_callback_clear_event() {
        API.clear();
        let events = record_events();

        API.clear();

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0], "Clearing the Registry");
        drop(captured);

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_clear_trace_callback_stops_events() {
        API.clear();
        let events = record_events();

        let _: Arc<u16> = API.instance();
        assert_eq!(events.lock().unwrap().len(), 2);

        API.clear_trace_callback();

        let _: Arc<u16> = API.instance();
        let _ = API.contains::<u16>();

        assert_eq!(events.lock().unwrap().len(), 2);
    }
}
