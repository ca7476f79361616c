//! Run report
//!
//! Every `test` call appends a [`TestOutcome`]; the [`TestReport`] groups
//! them by suite and keeps the totals.

use std::fmt;
use std::time::Duration;

/// Outcome of a single `test` call
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    /// Suite name active when the test ran (empty outside `describe`)
    pub suite: String,
    /// Name passed to `test`
    pub name: String,
    /// Whether every assertion passed
    pub passed: bool,
    /// Diagnostic of the last failed assertion
    pub diagnostic: Option<String>,
    /// Wall-clock time spent in the test body
    pub duration: Duration,
}

/// Aggregated results for a single suite.
#[derive(Debug, Clone, Default)]
pub struct SuiteResult {
    pub name: String,
    pub tests: Vec<TestOutcome>,
    pub duration: Duration,
}

impl SuiteResult {
    pub fn failed(&self) -> usize {
        self.tests.iter().filter(|t| !t.passed).count()
    }
}

/// Summary report for a test run.
#[derive(Debug, Clone, Default)]
pub struct TestReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
    pub suite_results: Vec<SuiteResult>,
}

impl TestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outcome, appending to the last suite when the name matches
    pub fn record(&mut self, outcome: TestOutcome) {
        self.total += 1;
        if outcome.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.duration += outcome.duration;

        let continues_last = self
            .suite_results
            .last()
            .is_some_and(|last| last.name == outcome.suite);
        if !continues_last {
            self.suite_results.push(SuiteResult {
                name: outcome.suite.clone(),
                ..SuiteResult::default()
            });
        }
        if let Some(suite) = self.suite_results.last_mut() {
            suite.duration += outcome.duration;
            suite.tests.push(outcome);
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed outcomes in run order
    pub fn failures(&self) -> impl Iterator<Item = &TestOutcome> {
        self.suite_results
            .iter()
            .flat_map(|s| s.tests.iter())
            .filter(|t| !t.passed)
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total: {}  Passed: {}  Failed: {}",
            self.total, self.passed, self.failed
        )?;
        writeln!(f, "Duration: {:?}", self.duration)
    }
}
