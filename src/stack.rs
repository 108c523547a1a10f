//! Call stack introspection.
//!
//! A [`StackFrame`] pairs a function with the call expression that invoked it:
//! frame 0 is the most recent call, `function` is the called function's bare
//! name and `file`/`line` point at the line that called it. Argument values are
//! never captured.

use std::fmt;

/// One frame of a captured call stack.
///
/// Every field is optional; frames resolved without debug info simply lack them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// Source file of the call expression.
    pub file: Option<String>,
    /// Line of the call expression.
    pub line: Option<u32>,
    /// Bare name of the called function.
    pub function: Option<String>,
}

impl StackFrame {
    /// A frame with every field known.
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            function: Some(function.into()),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}:{}",
            self.function.as_deref().unwrap_or("<unknown>"),
            self.file.as_deref().unwrap_or("<unknown>"),
            self.line.unwrap_or(0)
        )
    }
}

/// Something that can produce the current call stack.
pub trait StackSource: Send + Sync {
    /// Returns at most `depth` frames, most recent first.
    fn capture(&self, depth: usize) -> Vec<StackFrame>;
}

/// Walks the live stack with the `backtrace` crate.
///
/// Frames belonging to the walker itself are dropped, so frame 0 is the
/// function that asked for the capture. Symbol names need debug info; in
/// stripped binaries fields come back empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceStack;

/// A resolved symbol: the function and the line currently executing in it.
struct Resolved {
    function: String,
    file: Option<String>,
    line: Option<u32>,
}

impl StackSource for BacktraceStack {
    #[inline(never)]
    fn capture(&self, depth: usize) -> Vec<StackFrame> {
        if depth == 0 {
            return Vec::new();
        }

        let mut resolved: Vec<Resolved> = Vec::with_capacity(depth + 1);
        let mut seen_capture = false;
        let mut initial_filtering = true;

        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                let Some(sym) = symbol.name() else {
                    return;
                };
                let demangled = format!("{sym:#}");

                // Everything up to and including this function belongs to the walker.
                if initial_filtering {
                    if is_capture_frame(&demangled) {
                        seen_capture = true;
                        return;
                    }
                    if !seen_capture || demangled.starts_with("backtrace::") {
                        return;
                    }
                    initial_filtering = false;
                }

                resolved.push(Resolved {
                    function: bare_function_name(&demangled).to_owned(),
                    file: symbol.filename().map(|p| p.display().to_string()),
                    line: symbol.lineno(),
                });
            });

            // One extra frame is needed for the call site of the last one.
            resolved.len() <= depth
        });

        frames_from_resolved(&resolved, depth)
    }
}

fn is_capture_frame(demangled: &str) -> bool {
    demangled.contains(concat!(module_path!(), "::"))
}

/// Shifts locations down by one: each function is paired with the line of its caller.
fn frames_from_resolved(resolved: &[Resolved], depth: usize) -> Vec<StackFrame> {
    resolved
        .iter()
        .enumerate()
        .take(depth)
        .map(|(i, current)| {
            let call_site = resolved.get(i + 1);
            StackFrame {
                file: call_site.and_then(|c| c.file.clone()),
                line: call_site.and_then(|c| c.line),
                function: Some(current.function.clone()),
            }
        })
        .collect()
}

/// A fixed list of frames, for call sites identified explicitly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixedStack(pub Vec<StackFrame>);

impl StackSource for FixedStack {
    fn capture(&self, depth: usize) -> Vec<StackFrame> {
        self.0.iter().take(depth).cloned().collect()
    }
}

/// Reduces a demangled symbol to the bare function name.
///
/// `<app::Old as app::Api>::call::{{closure}}` becomes `call`.
pub fn bare_function_name(demangled: &str) -> &str {
    let mut name = demangled;
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }

    // v0 mangling keeps generic arguments: `app::convert::<u8>`.
    if name.ends_with('>') {
        if let Some(idx) = name.rfind("::<") {
            name = &name[..idx];
        }
    }

    match name.rfind("::") {
        Some(idx) => &name[idx + 2..],
        None => name,
    }
}

/// Name of the function enclosing a `deprecated!` expansion.
#[doc(hidden)]
pub fn enclosing_function(marker_type_name: &str) -> &str {
    let name = marker_type_name
        .strip_suffix("::__here")
        .unwrap_or(marker_type_name);
    bare_function_name(name)
}
