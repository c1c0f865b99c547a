use std::{fmt, time::Duration};

use crate::{action::ActionError, tree::HookKind};

/// Ancestor suite names followed by the node's own name.
pub type NamePath = Vec<String>;

/// Render a name path the way reporters print it, `A > b > c`.
pub fn display_path(path: &[String]) -> String {
    path.join(" > ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestOutcome {
    pub status: TestStatus,
    pub duration: Duration,
}

impl TestOutcome {
    pub fn is_good(&self) -> bool {
        self.status.is_good()
    }

    pub fn is_bad(&self) -> bool {
        self.status.is_bad()
    }

    pub fn passed(&self) -> bool {
        self.status.passed()
    }

    pub fn failed(&self) -> bool {
        self.status.failed()
    }

    pub fn errored(&self) -> bool {
        self.status.errored()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    /// The test body or one of its per-test hooks failed.
    Failed(TestFailure),
    /// The test never ran because a suite-level `before` hook above it failed.
    Errored(HookFailure),
}

impl TestStatus {
    pub fn is_good(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn is_bad(&self) -> bool {
        !self.is_good()
    }

    pub fn passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn failed(&self) -> bool {
        matches!(self, TestStatus::Failed(_))
    }

    pub fn errored(&self) -> bool {
        matches!(self, TestStatus::Errored(_))
    }
}

/// Where in a test's chain the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    BeforeEach,
    Body,
    AfterEach,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestFailure {
    pub phase: TestPhase,
    pub error: ActionError,
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            TestPhase::Body => write!(f, "{}", self.error),
            TestPhase::BeforeEach => write!(f, "in before_each hook: {}", self.error),
            TestPhase::AfterEach => write!(f, "in after_each hook: {}", self.error),
        }
    }
}

/// A failed suite-level hook.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct HookFailure {
    /// Path of the suite owning the hook.
    pub suite: NamePath,
    pub kind: HookKind,
    pub error: ActionError,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suite.is_empty() {
            true => write!(f, "{} hook of root suite: {}", self.kind.as_str(), self.error),
            false => write!(
                f,
                "{} hook of \"{}\": {}",
                self.kind.as_str(),
                display_path(&self.suite),
                self.error
            ),
        }
    }
}

/// The outcome of one suite, mirroring the selected part of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SuiteOutcome {
    pub path: NamePath,
    pub hook_errors: Vec<HookFailure>,
    pub children: Vec<NodeOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    Suite(SuiteOutcome),
    Test { path: NamePath, outcome: TestOutcome },
}

impl SuiteOutcome {
    /// Every test outcome below this suite, in execution order.
    pub fn tests(&self) -> Vec<(&NamePath, &TestOutcome)> {
        let mut tests = Vec::new();
        self.collect_tests(&mut tests);
        tests
    }

    fn collect_tests<'o>(&'o self, into: &mut Vec<(&'o NamePath, &'o TestOutcome)>) {
        for child in &self.children {
            match child {
                NodeOutcome::Suite(suite) => suite.collect_tests(into),
                NodeOutcome::Test { path, outcome } => into.push((path, outcome)),
            }
        }
    }

    /// Every hook failure in this suite and below.
    pub fn hook_failures(&self) -> Vec<&HookFailure> {
        let mut failures: Vec<_> = self.hook_errors.iter().collect();
        for child in &self.children {
            if let NodeOutcome::Suite(suite) = child {
                failures.extend(suite.hook_failures());
            }
        }
        failures
    }
}

/// Counts for a finished run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub hook_errors: usize,
    pub filtered_out: usize,
    pub duration: Duration,
}

impl Summary {
    pub fn from_outcomes(root: &SuiteOutcome, filtered_out: usize, duration: Duration) -> Self {
        let mut summary = Summary {
            filtered_out,
            duration,
            hook_errors: root.hook_failures().len(),
            ..Default::default()
        };
        for (_, outcome) in root.tests() {
            match outcome.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed(_) => summary.failed += 1,
                TestStatus::Errored(_) => summary.errored += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0 && self.hook_errors == 0
    }
}
