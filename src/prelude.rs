//! Prelude module for convenient imports
//!
//! ```
//! use verity::prelude::*;
//!
//! let mut realm = Realm::new();
//! let harness = install(&mut realm, TestConfig::plain());
//! assert!(harness.report().all_passed());
//! ```

// Host types
pub use crate::runtime::{Function, Module, ObjectKind, Output, Realm, Value};

// Error handling
pub use crate::error::{Error, ErrorKind, Result, StackFrame, StackTrace};

// Module metadata
pub use crate::modules::{ModuleRegistry, ScriptId};

// Test framework
pub use crate::test_runner::{
    compare, exports, install, ColorMode, ComparePolicy, Expectation, MatchOutcome, Matcher,
    TestConfig, TestHarness, TestReport,
};
