//! Macros for isolated registries and explicit deprecation call sites.

/// Creates an isolated single-instance registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - Storage static (hidden)
/// - Trace callback static (hidden)
/// - An `Api` struct that implements `RegistryApi`
/// - Free functions mirroring [`crate::registry`]
///
/// # Examples
///
/// ```rust
/// use deprecation_reporter::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(services);
///
/// #[derive(Default)]
/// struct Clock {
///     ticks: u64,
/// }
///
/// let a: Arc<Clock> = services::instance();
/// let b: Arc<Clock> = services::instance();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(b.ticks, 0);
/// ```
///
/// Registries created this way do not share instances with each other or with
/// the process-wide [`crate::registry`], which makes them suitable for passing a
/// set of singletons around explicitly.
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock, Mutex};
            use std::collections::HashMap;
            use std::any::{TypeId, Any};

            // Storage for constructed instances (module-private)
            static STORAGE: LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
                LazyLock::new(|| Mutex::new(HashMap::new()));

            // Trace callback storage (module-private)
            static TRACE: LazyLock<Mutex<Option<Arc<dyn Fn(&$crate::RegistryEvent) + Send + Sync>>>> =
                LazyLock::new(|| Mutex::new(None));

            /// Zero-sized type that implements the registry API.
            pub struct Api;

            impl $crate::RegistryApi for Api {
                fn storage() -> &'static LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> {
                    &STORAGE
                }

                fn trace() -> &'static LazyLock<Mutex<Option<Arc<dyn Fn(&$crate::RegistryEvent) + Send + Sync>>>> {
                    &TRACE
                }
            }

            /// Convenient constant for trait-based access.
            pub const API: Api = Api;

            /// Returns the instance of `T`, building it with `T::default()` on first use.
            pub fn instance<T: Default + Send + Sync + 'static>() -> Arc<T> {
                use $crate::RegistryApi;
                API.instance()
            }

            /// Returns the instance of `T`, building it with `init` on first use.
            pub fn try_instance<T, E>(init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E>
            where
                T: Send + Sync + 'static,
            {
                use $crate::RegistryApi;
                API.try_instance(init)
            }

            /// Retrieve a stored instance without constructing one.
            pub fn get<T: Send + Sync + 'static>() -> Result<Arc<T>, $crate::RegistryError> {
                use $crate::RegistryApi;
                API.get()
            }

            /// Check if a type has a stored instance.
            pub fn contains<T: Send + Sync + 'static>() -> Result<bool, $crate::RegistryError> {
                use $crate::RegistryApi;
                API.contains::<T>()
            }

            /// Warn when a `T` is built while an instance is already stored.
            pub fn note_construction<T: 'static>() -> bool {
                use $crate::RegistryApi;
                API.note_construction::<T>()
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static) {
                use $crate::RegistryApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::RegistryApi;
                API.clear_trace_callback()
            }
        }
    };
}

/// Reports a deprecated call site captured at compile time.
///
/// Place it at the top of a deprecated function. Frame 0 is the macro's own
/// location plus the enclosing function's name; frame 1 is
/// [`Location::caller`](std::panic::Location::caller), which names the code that
/// called the deprecated function when that function is `#[track_caller]`.
///
/// Evaluates to the `Result` of [`Reporter::report_frames`](crate::Reporter::report_frames).
///
/// ```
/// use deprecation_reporter::{deprecated, Reporter};
/// use std::sync::{Arc, Mutex};
///
/// let lines = Arc::new(Mutex::new(Vec::<String>::new()));
/// let sink = lines.clone();
/// let reporter = Reporter::new();
/// reporter.set_logger(move |m: &str| sink.lock().unwrap().push(m.to_owned()));
///
/// #[track_caller]
/// fn old_sum(reporter: &Reporter, a: i32, b: i32) -> i32 {
///     let _ = deprecated!(reporter, "use i32::saturating_add");
///     a + b
/// }
///
/// assert_eq!(old_sum(&reporter, 1, 2), 3);
/// let lines = lines.lock().unwrap();
/// assert!(lines[0].contains("-> old_sum from"));
/// assert!(lines[0].ends_with("(use i32::saturating_add)"));
/// ```
#[macro_export]
macro_rules! deprecated {
    ($reporter:expr) => {
        $crate::deprecated!($reporter, "")
    };
    ($reporter:expr, $extra:expr) => {{
        fn __here() {}
        let caller = ::std::panic::Location::caller();
        let frames = [
            $crate::StackFrame::new(
                file!(),
                line!(),
                $crate::stack::enclosing_function(::std::any::type_name_of_val(&__here)),
            ),
            $crate::StackFrame::new(caller.file(), caller.line(), ""),
        ];
        let extra: &str = $extra;
        $reporter.report_frames(&frames, Some(extra))
    }};
}
