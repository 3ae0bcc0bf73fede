//! Aggregate model of a test execution
//!
//! Events from the runner are folded one at a time into an [`Execution`],
//! which owns one [`Package`] aggregate per package seen. Packages track
//! in-flight tests, completed [`TestCase`]s partitioned by outcome, and the
//! raw output lines grouped so they can be replayed in order later.

use crate::classify::{classify_line, OutputKind};
use crate::event::{Action, TestEvent};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Output buffer id reserved for package-scoped output. Nonzero ids are
/// bound to individual in-flight tests.
pub const PKG_OUTPUT_ID: usize = 0;

/// Terminal outcome and timing of a single test.
///
/// Identity is (package, test name); subtests with distinct names are
/// distinct cases. A case is never mutated once its terminal outcome has
/// been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Import path of the owning package.
    pub package: String,
    /// Full test name, including any subtest path.
    pub test: String,
    /// Time the test took, as reported by its terminal event.
    pub elapsed: Duration,
    id: usize,
}

impl TestCase {
    /// The output line-group id bound to this test while it was running.
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Per-package rollup of status, timing, output, and derived flags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Package {
    action: Option<Action>,
    elapsed: Duration,
    cached: bool,
    coverage: String,
    running: HashMap<String, TestCase>,
    passed: Vec<TestCase>,
    failed: Vec<TestCase>,
    skipped: Vec<TestCase>,
    output: HashMap<usize, Vec<String>>,
    next_id: usize,
}

impl Package {
    /// The package's terminal action, or `None` if the package never
    /// completed (e.g. the scan was aborted mid-build).
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// True if the package result was served from the test cache.
    pub fn cached(&self) -> bool {
        self.cached
    }

    /// The coverage clause extracted from the output, empty if none was
    /// seen. The last coverage line wins if several appear.
    pub fn coverage(&self) -> &str {
        &self.coverage
    }

    /// Completed tests that passed, in completion order.
    pub fn passed(&self) -> &[TestCase] {
        &self.passed
    }

    /// Completed tests that failed, in completion order.
    pub fn failed(&self) -> &[TestCase] {
        &self.failed
    }

    /// Completed tests that were skipped, in completion order.
    pub fn skipped(&self) -> &[TestCase] {
        &self.skipped
    }

    /// Tests currently in flight, keyed by name.
    pub fn running(&self) -> &HashMap<String, TestCase> {
        &self.running
    }

    /// Number of completed tests across all outcomes.
    pub fn total_cases(&self) -> usize {
        self.passed.len() + self.failed.len() + self.skipped.len()
    }

    /// Output lines recorded under the given line-group id, in arrival
    /// order. [`PKG_OUTPUT_ID`] holds package-scoped output.
    pub fn output_lines(&self, id: usize) -> &[String] {
        self.output.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of elapsed durations over every completed test in the package.
    ///
    /// Tests still running contribute nothing. This is distinct from
    /// [`Package::reported_elapsed`], the duration the runner reported for
    /// the package itself.
    pub fn elapsed(&self) -> Duration {
        self.passed
            .iter()
            .chain(&self.failed)
            .chain(&self.skipped)
            .map(|tc| tc.elapsed)
            .sum()
    }

    /// The elapsed duration carried on the package-level terminal event,
    /// zero if none was seen.
    pub fn reported_elapsed(&self) -> Duration {
        self.elapsed
    }

    fn allocate_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn add_event(&mut self, event: &TestEvent) {
        match event.action {
            Action::Run if event.is_test_level() => {
                let id = self.allocate_id();
                self.running.insert(
                    event.test.clone(),
                    TestCase {
                        package: event.package.clone(),
                        test: event.test.clone(),
                        elapsed: Duration::ZERO,
                        id,
                    },
                );
            }
            Action::Output | Action::BuildOutput => {
                self.add_output(event);
            }
            Action::Pause | Action::Cont => {
                // Informational, but text they carry is still recorded.
                if !event.output.is_empty() {
                    self.add_output(event);
                }
            }
            Action::BuildFail => {
                self.action = Some(Action::Fail);
            }
            Action::Pass | Action::Fail | Action::Skip => {
                if event.is_test_level() {
                    self.complete_test(event);
                } else {
                    self.action = Some(event.action);
                    if event.elapsed > Duration::ZERO {
                        self.elapsed = event.elapsed;
                    }
                }
            }
            // Package-level run and bench results carry no state we track.
            Action::Run | Action::Bench => {}
        }
    }

    fn add_output(&mut self, event: &TestEvent) {
        let id = if event.is_test_level() {
            self.running
                .get(&event.test)
                .map(|tc| tc.id)
                .unwrap_or(PKG_OUTPUT_ID)
        } else {
            PKG_OUTPUT_ID
        };
        self.output.entry(id).or_default().push(event.output.clone());

        match classify_line(&event.output) {
            OutputKind::Coverage(text) => self.coverage = text,
            OutputKind::Cached => self.cached = true,
            OutputKind::BuildFailed => self.action = Some(Action::Fail),
            OutputKind::None => {}
        }
    }

    fn complete_test(&mut self, event: &TestEvent) {
        // Some runners omit the run event for fast tests, so a terminal
        // event for an unseen test synthesizes the case directly. This is a
        // deliberate leniency: duplicate or out-of-order events from the
        // runner are folded in rather than rejected.
        let mut case = match self.running.remove(&event.test) {
            Some(case) => case,
            None => {
                let id = self.allocate_id();
                TestCase {
                    package: event.package.clone(),
                    test: event.test.clone(),
                    elapsed: Duration::ZERO,
                    id,
                }
            }
        };
        case.elapsed = event.elapsed;

        match event.action {
            Action::Pass => self.passed.push(case),
            Action::Fail => self.failed.push(case),
            Action::Skip => self.skipped.push(case),
            _ => unreachable!("complete_test called with non-terminal action"),
        }
    }
}

/// Top-level aggregate owning all package state for one scan.
///
/// Constructed and mutated only by the scan loop; once the scan returns,
/// the caller holds it as read-only queryable state.
#[derive(Debug)]
pub struct Execution {
    started: DateTime<Utc>,
    packages: HashMap<String, Package>,
    total: usize,
    errors: Vec<String>,
}

impl Execution {
    pub(crate) fn new() -> Self {
        Execution {
            started: Utc::now(),
            packages: HashMap::new(),
            total: 0,
            errors: Vec::new(),
        }
    }

    /// Fold one event into the aggregate, creating the package on first
    /// reference. Never fails: malformed logical sequences are tolerated.
    pub(crate) fn add(&mut self, event: &TestEvent) {
        if event.action.is_terminal() && event.is_test_level() {
            self.total += 1;
        }
        self.packages
            .entry(event.package.clone())
            .or_default()
            .add_event(event);
    }

    /// Record an input line that could not be parsed.
    pub(crate) fn add_error(&mut self, line: &str) {
        self.errors.push(line.to_string());
    }

    /// Wall-clock time the scan started.
    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Count of terminal test-level outcomes seen so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Look up the aggregate for a package by import path.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Iterate over all packages seen during the scan.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &Package)> {
        self.packages.iter().map(|(name, pkg)| (name.as_str(), pkg))
    }

    /// Input lines that failed to parse, in arrival order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}
