//! Deriving caller and callee identity from captured frames.

use crate::StackFrame;

/// Placeholder for file and function fields whose frame is missing entirely.
///
/// Lines are rendered as integers, so a missing frame reads as line `0`.
pub const UNDEFINED: &str = "UNDEFINED";

/// Identity of a deprecated call: where the deprecated code is and who called it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSiteInfo {
    pub called_file: String,
    pub called_line: u32,
    pub called_func: String,
    pub caller_file: String,
    pub caller_line: u32,
    pub caller_func: String,
}

impl Default for CallSiteInfo {
    fn default() -> Self {
        Self {
            called_file: UNDEFINED.to_owned(),
            called_line: 0,
            called_func: UNDEFINED.to_owned(),
            caller_file: UNDEFINED.to_owned(),
            caller_line: 0,
            caller_func: UNDEFINED.to_owned(),
        }
    }
}

fn fields(frame: &StackFrame) -> (String, u32, String) {
    (
        frame.file.clone().unwrap_or_default(),
        frame.line.unwrap_or(0),
        frame.function.clone().unwrap_or_default(),
    )
}

impl CallSiteInfo {
    /// Reads the called site from frame 0 and the caller from frame 1.
    ///
    /// When frame 0 is the reporter's own `entry_point`, the deprecated function
    /// is frame 1's function and the caller function is left blank. Caller file
    /// and line stay as read from frame 1.
    pub fn from_frames(frames: &[StackFrame], entry_point: &str) -> Self {
        let mut info = Self::default();

        if let Some(called) = frames.first() {
            (info.called_file, info.called_line, info.called_func) = fields(called);
        }
        if let Some(caller) = frames.get(1) {
            (info.caller_file, info.caller_line, info.caller_func) = fields(caller);
        }

        let entered_directly = frames
            .first()
            .is_some_and(|f| f.function.as_deref() == Some(entry_point));
        let shifted_func = frames.get(1).and_then(|f| f.function.as_ref());
        if let (true, Some(func)) = (entered_directly, shifted_func) {
            info.called_func = func.clone();
            info.caller_func = String::new();
        }

        info
    }

    /// Composes the log line. `extra` is appended in parentheses when non-empty;
    /// `None` and `Some("")` produce the same message.
    pub fn message(&self, extra: Option<&str>) -> String {
        let mut message = format!(
            "Deprecated call to {}:{} -> {} from {}:{}",
            self.called_file,
            self.called_line,
            self.called_func,
            self.caller_file,
            self.caller_line
        );
        if let Some(extra) = extra.filter(|e| !e.is_empty()) {
            message.push_str(" (");
            message.push_str(extra);
            message.push(')');
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn php_like_stack() -> Vec<StackFrame> {
        vec![
            StackFrame::new("a.php", 10, "oldFn"),
            StackFrame::new("b.php", 20, "caller"),
        ]
    }

    #[test]
    fn test_two_frames() {
        let info = CallSiteInfo::from_frames(&php_like_stack(), "report");
        assert_eq!(info.called_file, "a.php");
        assert_eq!(info.called_line, 10);
        assert_eq!(info.called_func, "oldFn");
        assert_eq!(info.caller_file, "b.php");
        assert_eq!(info.caller_line, 20);
        assert_eq!(info.caller_func, "caller");
        assert_eq!(
            info.message(None),
            "Deprecated call to a.php:10 -> oldFn from b.php:20"
        );
    }

    #[test]
    fn test_extra_message_policy() {
        let info = CallSiteInfo::from_frames(&php_like_stack(), "report");
        assert_eq!(info.message(Some("")), info.message(None));
        assert_eq!(
            info.message(Some("use newFn")),
            "Deprecated call to a.php:10 -> oldFn from b.php:20 (use newFn)"
        );
    }

    #[test]
    fn test_no_frames_uses_sentinels() {
        let info = CallSiteInfo::from_frames(&[], "report");
        assert_eq!(info, CallSiteInfo::default());
        assert_eq!(
            info.message(None),
            "Deprecated call to UNDEFINED:0 -> UNDEFINED from UNDEFINED:0"
        );
    }

    #[test]
    fn test_single_frame() {
        let frames = [StackFrame::new("a.php", 10, "oldFn")];
        let info = CallSiteInfo::from_frames(&frames, "report");
        assert_eq!(
            info.message(None),
            "Deprecated call to a.php:10 -> oldFn from UNDEFINED:0"
        );
        assert_eq!(info.caller_func, UNDEFINED);
    }

    #[test]
    fn test_missing_fields_default_to_empty_and_zero() {
        let frames = [StackFrame::default(), StackFrame::default()];
        let info = CallSiteInfo::from_frames(&frames, "report");
        assert_eq!(info.called_file, "");
        assert_eq!(info.called_line, 0);
        assert_eq!(info.called_func, "");
        assert_eq!(info.message(None), "Deprecated call to :0 ->  from :0");
    }

    #[test]
    fn test_direct_entry_shifts_function_only() {
        let frames = [
            StackFrame::new("legacy.rs", 5, "report"),
            StackFrame::new("main.rs", 42, "old_fn"),
        ];
        let info = CallSiteInfo::from_frames(&frames, "report");
        assert_eq!(info.called_func, "old_fn");
        assert_eq!(info.caller_func, "");
        // Caller location is still frame 1's.
        assert_eq!(info.called_file, "legacy.rs");
        assert_eq!(info.caller_file, "main.rs");
        assert_eq!(info.caller_line, 42);
        assert_eq!(
            info.message(None),
            "Deprecated call to legacy.rs:5 -> old_fn from main.rs:42"
        );
    }

    #[test]
    fn test_direct_entry_without_second_frame() {
        let frames = [StackFrame::new("legacy.rs", 5, "report")];
        let info = CallSiteInfo::from_frames(&frames, "report");
        assert_eq!(info.called_func, "report");
        assert_eq!(info.caller_func, UNDEFINED);
    }

    #[test]
    fn test_direct_entry_with_nameless_second_frame() {
        let frames = [
            StackFrame::new("legacy.rs", 5, "report"),
            StackFrame {
                function: None,
                ..StackFrame::new("main.rs", 42, "")
            },
        ];
        let info = CallSiteInfo::from_frames(&frames, "report");
        assert_eq!(info.called_func, "report");
        assert_eq!(info.caller_func, "");
        assert_eq!(
            info.message(None),
            "Deprecated call to legacy.rs:5 -> report from main.rs:42"
        );
    }
}
