//! Error types for the Verity runtime and test framework

use crate::modules::ScriptId;
use std::fmt;
use thiserror::Error;

/// A single frame in a captured call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name (`"<module>"` for top-level module code)
    pub function_name: String,
    /// Script the frame's code was compiled from
    pub script_id: Option<ScriptId>,
    /// Resolved module URL (if known)
    pub file_name: Option<String>,
    /// Line number in source (1-indexed)
    pub line: u32,
}

impl StackFrame {
    /// Create a new stack frame for script code
    pub fn new(function_name: impl Into<String>, script_id: ScriptId, line: u32) -> Self {
        Self {
            function_name: function_name.into(),
            script_id: Some(script_id),
            file_name: None,
            line,
        }
    }

    /// Attach the resolved file name
    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file_name {
            write!(f, "    at {} ({}:{})", self.function_name, file, self.line)
        } else {
            write!(f, "    at {} (<anonymous>:{})", self.function_name, self.line)
        }
    }
}

/// A captured call stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    /// Stack frames from innermost to outermost
    pub frames: Vec<StackFrame>,
}

impl StackTrace {
    /// Create an empty stack trace
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Add a frame to the stack trace
    pub fn push(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    /// The innermost frame, if any
    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.first()
    }

    /// Check if the stack trace is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{}", frame)?;
        }
        Ok(())
    }
}

/// Main error type for Verity
#[derive(Error, Debug)]
pub enum Error {
    /// Script-level exception: TypeError, ReferenceError, etc.
    #[error("{kind}: {message}{}", if stack_trace.is_empty() { String::new() } else { format!("\n{}", stack_trace) })]
    RuntimeError {
        kind: ErrorKind,
        message: String,
        stack_trace: StackTrace,
    },

    /// Internal error in the host adapter
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error
    #[error("IOError: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// Module registration/lookup error
    #[error("ModuleError: {0}")]
    ModuleError(String),

    /// Malformed test configuration
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// Resource limit exceeded
    #[error("ResourceLimitError: {kind}: {message}")]
    ResourceLimitError {
        kind: ResourceLimitKind,
        message: String,
    },
}

/// Resource limit kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLimitKind {
    /// Call stack depth limit exceeded
    StackDepthLimit,
}

impl fmt::Display for ResourceLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLimitKind::StackDepthLimit => write!(f, "StackDepthLimit"),
        }
    }
}

/// Script error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// TypeError - wrong type or call shape
    TypeError,
    /// ReferenceError - undefined global
    ReferenceError,
    /// Generic Error - thrown by script code
    GenericError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TypeError => write!(f, "TypeError"),
            ErrorKind::ReferenceError => write!(f, "ReferenceError"),
            ErrorKind::GenericError => write!(f, "Error"),
        }
    }
}

impl Error {
    /// Create a TypeError
    pub fn type_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::TypeError,
            message: message.into(),
            stack_trace: StackTrace::new(),
        }
    }

    /// Create a ReferenceError
    pub fn reference_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::ReferenceError,
            message: message.into(),
            stack_trace: StackTrace::new(),
        }
    }

    /// Create a generic `Error`, as thrown by script code
    pub fn thrown(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::GenericError,
            message: message.into(),
            stack_trace: StackTrace::new(),
        }
    }

    /// Create a usage error: a TypeError raised for a malformed call to the
    /// test API, carrying the stack at the offending call.
    pub fn usage_error(message: impl Into<String>, stack_trace: StackTrace) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::TypeError,
            message: message.into(),
            stack_trace,
        }
    }

    /// Add stack trace to an existing error
    pub fn with_stack_trace(self, stack_trace: StackTrace) -> Self {
        match self {
            Error::RuntimeError { kind, message, .. } => Error::RuntimeError {
                kind,
                message,
                stack_trace,
            },
            other => other,
        }
    }

    /// Whether this is a TypeError (the class every usage error belongs to)
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::RuntimeError {
                kind: ErrorKind::TypeError,
                ..
            }
        )
    }

    /// The bare message of a script-level error
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::RuntimeError { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Create a stack depth limit exceeded error
    pub fn stack_depth_exceeded(depth: usize, limit: usize) -> Self {
        Error::ResourceLimitError {
            kind: ResourceLimitKind::StackDepthLimit,
            message: format!(
                "Call stack depth limit exceeded: {} frames, limit was {}",
                depth, limit
            ),
        }
    }
}

/// Result type alias for Verity
pub type Result<T> = std::result::Result<T, Error>;

/// Standardized usage-error messages for the test API
pub mod messages {
    pub const EXPECTED_TWO_ARGUMENTS: &str = "Expected 2 arguments";
    pub const FIRST_ARGUMENT_STRING: &str = "Expected 1st argument to be a string";
    pub const SECOND_ARGUMENT_FUNCTION: &str = "Expected 2nd argument to be a function";
    pub const EXPECT_MAX_ONE_ARGUMENT: &str = "Max. allowed: 1 argument";
    pub const NESTED_TEST: &str = "test() cannot be called inside another test";
    pub const NOT_A_FUNCTION: &str = "is not a function";
    pub const IS_NOT_DEFINED: &str = "is not defined";

    /// Format a "X is not a function" error message
    pub fn not_a_function(name: &str) -> String {
        format!("'{}' {}", name, NOT_A_FUNCTION)
    }

    /// Format a "X is not defined" error message
    pub fn not_defined(name: &str) -> String {
        format!("'{}' {}", name, IS_NOT_DEFINED)
    }

    /// Format a "matcher() requires no arguments" error message
    pub fn requires_no_arguments(matcher: &str) -> String {
        format!("{}() requires no arguments", matcher)
    }

    /// Format a "matcher() requires 1 argument" error message
    pub fn requires_one_argument(matcher: &str) -> String {
        format!("{}() requires 1 argument", matcher)
    }

    /// Format a "matcher() expects a number" error message
    pub fn requires_number(matcher: &str) -> String {
        format!("{}() expects a number", matcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_display_includes_stack() {
        let mut trace = StackTrace::new();
        trace.push(StackFrame::new("<module>", ScriptId(1), 4).with_file("/t/a.test.js"));
        let err = Error::usage_error(messages::EXPECT_MAX_ONE_ARGUMENT, trace);
        let text = err.to_string();
        assert!(text.starts_with("TypeError: Max. allowed: 1 argument"));
        assert!(text.contains("at <module> (/t/a.test.js:4)"));
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_frame_without_file() {
        let frame = StackFrame::new("helper", ScriptId(2), 9);
        assert_eq!(frame.to_string(), "    at helper (<anonymous>:9)");
    }

    #[test]
    fn test_generic_error_is_not_usage_error() {
        let err = Error::thrown("boom");
        assert_eq!(err.to_string(), "Error: boom");
        assert!(!err.is_usage_error());
        assert_eq!(err.message(), Some("boom"));
    }
}
