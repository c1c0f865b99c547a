//! Session state and the run driver.
//!
//! A [`Session`] owns everything one cycle needs: the suite tree, the
//! reporters and the set of spec files already loaded. A cycle is
//!
//! 1. start from a fresh session (or [`Session::reset`] an old one),
//! 2. discover spec files,
//! 3. load them, which builds the tree,
//! 4. [`run_all_tests`](Session::run_all_tests).
//!
//! Loading needs `&mut Session` and running borrows the tree, so the two
//! phases cannot overlap.

use std::{
    collections::HashSet,
    panic::{AssertUnwindSafe, catch_unwind},
    time::Instant,
};

use crate::{
    action::payload_as_string,
    ambient,
    config::Config,
    declare::BuildContext,
    discover::{self, Loader, SpecFile},
    engine::Engine,
    error::{LoadError, Result},
    outcome::Summary,
    report::{ListReport, RunReport},
    reporter::{EndListing, Event, ListTest, Reporter, RunStart, with_reporters},
    tree::{SuiteId, SuiteTree},
};

#[derive(Default)]
pub struct Session {
    tree: SuiteTree,
    reporters: Vec<Box<dyn Reporter>>,
    globals: bool,
    loaded: HashSet<&'static str>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the tree, the reporters and the loaded file set.
    ///
    /// Nothing declared before the reset is reachable afterwards.
    pub fn reset(&mut self) {
        log::debug!("resetting session");
        *self = Self::new();
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.add_reporter(Box::new(reporter));
        self
    }

    pub fn add_reporter(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    /// Allow loading spec files that use the ambient declaration API.
    pub fn with_globals(self, globals: bool) -> Self {
        Self { globals, ..self }
    }

    pub fn tree(&self) -> &SuiteTree {
        &self.tree
    }

    /// Declare nodes at the root through an explicit build context.
    pub fn declare<R>(&mut self, f: impl FnOnce(&mut BuildContext<'_>) -> R) -> R {
        f(&mut BuildContext::new(&mut self.tree))
    }

    /// Load a spec file into the tree.
    ///
    /// Each path loads at most once per session, returns `false` for repeats.
    pub fn load(&mut self, file: &SpecFile) -> Result<bool, LoadError> {
        if self.loaded.contains(file.path) {
            log::debug!("{} already loaded", file.path);
            return Ok(false);
        }
        if matches!(file.loader, Loader::Ambient(_)) && !self.globals {
            return Err(LoadError::GlobalsRequired {
                path: file.path.to_string(),
            });
        }
        self.loaded.insert(file.path);

        log::debug!("loading {}", file.path);
        let result = match file.loader {
            Loader::Explicit(load) => catch_unwind(AssertUnwindSafe(|| self.declare(load))),
            Loader::Ambient(load) => {
                catch_unwind(AssertUnwindSafe(|| ambient::bind(&mut self.tree, load)))
            }
        };
        result
            .map(|()| true)
            .map_err(|payload| LoadError::Panicked {
                path: file.path.to_string(),
                message: payload_as_string(payload),
            })
    }

    /// Run every selected test and report to all reporters.
    pub fn run_all_tests(&mut self) -> RunReport {
        let now = Instant::now();
        let tree = &self.tree;
        let scheduled = tree.count_selected(SuiteId::ROOT);
        let filtered_out = tree.test_count() - scheduled;
        log::debug!("running {scheduled} tests, {filtered_out} filtered out");

        let ((root, summary), reporter_errors) = with_reporters(&mut self.reporters, |events| {
            events.send(Event::RunStart(RunStart {
                scheduled,
                filtered_out,
            }));
            let root = Engine::new(tree, events).run();
            let summary = Summary::from_outcomes(&root, filtered_out, now.elapsed());
            events.send(Event::RunSummary(summary.clone()));
            (root, summary)
        });

        RunReport {
            root,
            summary,
            reporter_errors,
        }
    }

    /// Report the tests that would run, without running them.
    pub fn list(&mut self) -> ListReport {
        let tree = &self.tree;
        let tests: Vec<_> = tree
            .selected_tests(SuiteId::ROOT)
            .into_iter()
            .map(|id| tree.name_path(id.into()))
            .collect();
        let filtered_out = tree.test_count() - tests.len();

        let ((), reporter_errors) = with_reporters(&mut self.reporters, |events| {
            for path in &tests {
                events.send(Event::ListTest(ListTest { path: path.clone() }));
            }
            events.send(Event::EndListing(EndListing {
                selected: tests.len(),
                filtered_out,
            }));
        });

        ListReport {
            tests,
            filtered_out,
            reporter_errors,
        }
    }
}

/// What a cycle ended with.
#[derive(Debug)]
pub enum CycleOutcome {
    Ran(RunReport),
    Listed(ListReport),
}

impl std::process::Termination for CycleOutcome {
    fn report(self) -> std::process::ExitCode {
        match self {
            CycleOutcome::Ran(report) => report.report(),
            CycleOutcome::Listed(report) => report.report(),
        }
    }
}

/// Run one full cycle over `files` with a fresh session.
///
/// Required files load first, in the given order, then every discovered file.
pub fn run_cycle(config: &Config, files: &[SpecFile]) -> Result<CycleOutcome> {
    let mut session = Session::new().with_globals(config.globals);
    session.add_reporter(config.reporter());

    let required = discover::resolve_required(files, &config.require)?;
    let discovered = discover::discover_in(files, &config.patterns)?;
    for file in required.into_iter().chain(discovered) {
        session.load(file)?;
    }

    Ok(match config.list {
        true => CycleOutcome::Listed(session.list()),
        false => CycleOutcome::Ran(session.run_all_tests()),
    })
}
