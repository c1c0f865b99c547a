//! Execution of a finished suite tree.
//!
//! The engine walks the tree depth first in declaration order and runs every
//! action on the calling thread, one after another:
//!
//! 1. the suite's `before` hooks,
//! 2. every selected child, where a test runs as
//!    `before_each* -> body -> after_each*` and a suite recurses,
//! 3. the suite's `after` hooks.
//!
//! `before_each` hooks accumulate outermost first and `after_each` hooks
//! innermost first, so a test is wrapped by its ancestors' hooks like an onion.
//!
//! No failure escapes the engine. A failing test is reported and its siblings
//! carry on. A failing `before` hook marks every selected test below its suite
//! as errored without running them, skips that suite's `after` hooks, and the
//! run continues with the next sibling. The result is always a complete
//! [`SuiteOutcome`] tree.

use std::time::Instant;

use crate::{
    action::{ActionError, ActionHandle},
    outcome::{
        HookFailure, NamePath, NodeOutcome, SuiteOutcome, TestFailure, TestOutcome, TestPhase,
        TestStatus,
    },
    reporter::{Event, EventSender, SuiteStart, TestFinished},
    tree::{HookKind, Hooks, NodeId, SuiteId, SuiteTree, TestId},
};

/// Per-test hooks inherited from the enclosing suites.
#[derive(Debug, Default, Clone)]
pub struct HookChain<'t> {
    pub before_each: Vec<&'t ActionHandle>,
    pub after_each: Vec<&'t ActionHandle>,
}

impl<'t> HookChain<'t> {
    /// The chain seen by children of a suite with `hooks`.
    pub fn enter(&self, hooks: &'t Hooks) -> Self {
        let before_each = self
            .before_each
            .iter()
            .copied()
            .chain(hooks.before_each.iter())
            .collect();
        let after_each = hooks
            .after_each
            .iter()
            .chain(self.after_each.iter().copied())
            .collect();
        Self {
            before_each,
            after_each,
        }
    }
}

pub struct Engine<'t, 'e> {
    tree: &'t SuiteTree,
    events: &'e EventSender,
}

impl<'t, 'e> Engine<'t, 'e> {
    pub fn new(tree: &'t SuiteTree, events: &'e EventSender) -> Self {
        Self { tree, events }
    }

    /// Run the whole tree from the root.
    pub fn run(&self) -> SuiteOutcome {
        self.run_suite(SuiteId::ROOT, Vec::new(), &HookChain::default())
    }

    pub fn run_suite(
        &self,
        id: SuiteId,
        path: NamePath,
        inherited: &HookChain<'t>,
    ) -> SuiteOutcome {
        let suite = self.tree.suite(id);
        log::debug!("entering suite {path:?}");
        if !id.is_root() {
            self.events
                .send(Event::SuiteStart(SuiteStart { path: path.clone() }));
        }

        let mut outcome = SuiteOutcome {
            path,
            hook_errors: Vec::new(),
            children: Vec::new(),
        };

        if let Err(failure) = self.run_suite_hooks(&suite.hooks, HookKind::Before, &outcome.path) {
            outcome.children = self.error_selected(id, &outcome.path, &failure);
            outcome.hook_errors.push(failure);
            return outcome;
        }

        let chain = inherited.enter(&suite.hooks);
        for child in self.tree.selected_children(id) {
            let child_path = self.child_path(&outcome.path, child);
            let child_outcome = match child {
                NodeId::Test(test) => {
                    let test_outcome = self.run_test(test, &chain);
                    self.events.send(Event::TestFinished(TestFinished {
                        path: child_path.clone(),
                        outcome: test_outcome.clone(),
                    }));
                    NodeOutcome::Test {
                        path: child_path,
                        outcome: test_outcome,
                    }
                }
                NodeId::Suite(suite) => NodeOutcome::Suite(self.run_suite(suite, child_path, &chain)),
            };
            outcome.children.push(child_outcome);
        }

        if let Err(failure) = self.run_suite_hooks(&suite.hooks, HookKind::After, &outcome.path) {
            outcome.hook_errors.push(failure);
        }

        log::debug!("leaving suite {:?}", outcome.path);
        outcome
    }

    fn child_path(&self, parent: &NamePath, child: NodeId) -> NamePath {
        let name = match child {
            NodeId::Test(id) => self.tree.test(id).name.as_ref(),
            NodeId::Suite(id) => self.tree.suite(id).name.as_deref().unwrap_or_default(),
        };
        let mut path = parent.clone();
        path.push(name.to_string());
        path
    }

    /// Run the `before` or `after` hooks of a suite, stopping at the first failure.
    fn run_suite_hooks(
        &self,
        hooks: &Hooks,
        kind: HookKind,
        path: &NamePath,
    ) -> Result<(), HookFailure> {
        for hook in hooks.get(kind) {
            log::trace!("running {} hook of {path:?}", kind.as_str());
            if let Err(error) = hook.call() {
                let failure = HookFailure {
                    suite: path.clone(),
                    kind,
                    error,
                };
                log::warn!("{failure}");
                self.events.send(Event::HookError(failure.clone()));
                return Err(failure);
            }
        }
        Ok(())
    }

    fn run_test(&self, id: TestId, chain: &HookChain<'t>) -> TestOutcome {
        let test = self.tree.test(id);
        let now = Instant::now();
        let status = match Self::run_test_chain(&test.action, chain) {
            Ok(()) => TestStatus::Passed,
            Err(failure) => TestStatus::Failed(failure),
        };
        TestOutcome {
            status,
            duration: now.elapsed(),
        }
    }

    fn run_test_chain(body: &ActionHandle, chain: &HookChain<'t>) -> Result<(), TestFailure> {
        let fail = |phase: TestPhase| move |error: ActionError| TestFailure { phase, error };

        for hook in &chain.before_each {
            hook.call().map_err(fail(TestPhase::BeforeEach))?;
        }
        body.call().map_err(fail(TestPhase::Body))?;
        for hook in &chain.after_each {
            hook.call().map_err(fail(TestPhase::AfterEach))?;
        }
        Ok(())
    }

    /// Report every selected test below `id` as errored by `failure`.
    fn error_selected(
        &self,
        id: SuiteId,
        path: &NamePath,
        failure: &HookFailure,
    ) -> Vec<NodeOutcome> {
        self.tree
            .selected_children(id)
            .map(|child| {
                let child_path = self.child_path(path, child);
                match child {
                    NodeId::Test(_) => {
                        let outcome = TestOutcome {
                            status: TestStatus::Errored(failure.clone()),
                            duration: Default::default(),
                        };
                        self.events.send(Event::TestFinished(TestFinished {
                            path: child_path.clone(),
                            outcome: outcome.clone(),
                        }));
                        NodeOutcome::Test {
                            path: child_path,
                            outcome,
                        }
                    }
                    NodeId::Suite(suite) => {
                        let children = self.error_selected(suite, &child_path, failure);
                        NodeOutcome::Suite(SuiteOutcome {
                            path: child_path,
                            hook_errors: Vec::new(),
                            children,
                        })
                    }
                }
            })
            .collect()
    }
}
