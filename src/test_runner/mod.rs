//! Built-in test framework for Verity
//!
//! Provides `describe`, `test` and `expect` to script code running in a
//! [`Realm`]. Tests run synchronously, in call order, and report to the
//! realm's output as they finish:
//!
//! ```text
//! ✓ math adds
//! ✗ math divides
//! Expected: 2
//! Received: 3
//!    at /proj/math.test.js:9
//! ```
//!
//! Assertion failures never throw. A matcher that fails records its
//! diagnostic in the [`ResultChannel`], and the enclosing `test` reads the
//! channel once its body returns. Usage errors (bad arity or argument
//! types) are thrown as `TypeError`s and abort module evaluation.
//!
//! # Example
//!
//! ```
//! use verity::runtime::{Output, Realm, Value};
//! use verity::test_runner::{install, TestConfig};
//!
//! let output = Output::buffer();
//! let mut realm = Realm::with_output(output.clone());
//! let harness = install(&mut realm, TestConfig::plain());
//!
//! let module = realm
//!     .compile_module("/proj/truth.test.js", |_| Ok(Value::Undefined))
//!     .unwrap();
//! let body = module.function(None, 3, |realm, _| {
//!     let handle = realm.call_global("expect", &[Value::from(true)])?;
//!     realm.call_method(&handle, "toBeTrue", &[])
//! });
//! let passed = realm
//!     .call_global("test", &[Value::from("truth"), body])
//!     .unwrap();
//!
//! assert_eq!(passed, Value::Boolean(true));
//! assert_eq!(harness.report().passed, 1);
//! assert_eq!(output.contents().unwrap(), "✓  truth\n");
//! ```

mod bindings;
mod channel;
mod compare;
mod config;
mod diagnostic;
mod expect;
mod matchers;
mod report;

pub use bindings::{exports, install};
pub use channel::{ChannelSlot, ResultChannel};
pub use compare::{compare, ComparePolicy, Comparator};
pub use config::{ColorMode, TestConfig};
pub use diagnostic::{format_failure, stringify_for_output, Color, Palette, SourcePosition};
pub use expect::Expectation;
pub use matchers::{MatchOutcome, Matcher};
pub use report::{SuiteResult, TestOutcome, TestReport};

use crate::error::{messages, Error, Result};
use crate::runtime::{Realm, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

/// Frames captured for usage-error reports
const USAGE_STACK_FRAMES: usize = 10;

/// Runs suites and tests for one realm and keeps the run report
#[derive(Debug)]
pub struct TestHarness {
    config: Rc<TestConfig>,
    report: RefCell<TestReport>,
    in_test: Cell<bool>,
}

impl TestHarness {
    pub fn new(config: TestConfig) -> Self {
        Self {
            config: Rc::new(config),
            report: RefCell::new(TestReport::new()),
            in_test: Cell::new(false),
        }
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    fn palette(&self) -> Palette {
        Palette::new(self.config.color.enabled())
    }

    /// Name a group of tests and run its body
    ///
    /// The body's errors propagate unchanged. A nested `describe` replaces
    /// the suite name for the rest of the run.
    pub fn describe(&self, realm: &mut Realm, name: &str, body: &Value) -> Result<()> {
        tracing::debug!(suite = name, "describe");
        ResultChannel::new(realm).set_suite_name(name);
        realm.call(body, &[])?;
        Ok(())
    }

    /// Run one test body and report it
    ///
    /// Returns whether every assertion made during the body passed. An
    /// error thrown by the body aborts the run and nothing is printed.
    pub fn test(&self, realm: &mut Realm, name: &str, body: &Value) -> Result<bool> {
        if self.in_test.get() {
            return Err(Error::usage_error(
                messages::NESTED_TEST,
                realm.capture_stack(USAGE_STACK_FRAMES),
            ));
        }

        ResultChannel::new(realm).reset_assertion();
        tracing::debug!(test = name, "test started");

        self.in_test.set(true);
        let started = Instant::now();
        let result = realm.call(body, &[]);
        let duration = started.elapsed();
        self.in_test.set(false);
        result?;

        let channel = ResultChannel::new(realm);
        let (passed, diagnostic) = channel.read_assertion();
        let suite = channel.suite_name();
        tracing::debug!(suite = %suite, test = name, passed, "test finished");

        let palette = self.palette();
        let (color, mark) = if passed {
            (palette.get(Color::Green), "✓")
        } else {
            (palette.get(Color::Red), "✗")
        };
        let reset = palette.get(Color::Reset);
        let mut line = format!("{color}{mark} {suite}{reset} {color}{name}{reset}\n");
        if !passed {
            line.push_str(&diagnostic);
        }
        realm.print(&line);

        self.report.borrow_mut().record(TestOutcome {
            suite,
            name: name.to_string(),
            passed,
            diagnostic: (!passed).then_some(diagnostic),
            duration,
        });
        Ok(passed)
    }

    /// Create an expectation for `subject`
    ///
    /// Inside a test body whose assertions have already failed, the
    /// returned handle is short-circuited. Top-level handles never are.
    pub fn expect(&self, realm: &mut Realm, subject: Option<Value>) -> Expectation {
        let expectation = Expectation::new(subject, Rc::clone(&self.config));
        if self.in_test.get() && ResultChannel::new(realm).assertion_failed() {
            expectation.short_circuited()
        } else {
            expectation
        }
    }

    /// Whether a `test` body is currently running
    pub fn in_test(&self) -> bool {
        self.in_test.get()
    }

    /// Snapshot of the run so far
    pub fn report(&self) -> TestReport {
        self.report.borrow().clone()
    }

    /// End the run, printing the summary when configured
    pub fn finish(&self, realm: &mut Realm) -> TestReport {
        let report = self.report();
        tracing::debug!(total = report.total, failed = report.failed, "test run finished");
        if self.config.report_summary {
            realm.print(&format!("\n{}", report));
        }
        report
    }
}
