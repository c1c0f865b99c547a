//! Reporting for kisuite.
//!
//! Reporters are sinks for the events a run produces. They never influence
//! execution: the engine only sends events, and whatever a reporter does with
//! them (print, collect, ignore) happens on a separate reporter thread.
//!
//! Events travel through a bounded channel to that thread, which hands every
//! event to each registered reporter in registration order. A reporter that
//! fails to write does not stop the run, its error is collected into the
//! final [`RunReport`](crate::report::RunReport).
//!
//! Implement [`Reporter`] to receive events. Every method has a no-op default,
//! so a reporter only implements the occasions it cares about.

use std::{io, thread};

use crate::{
    error::ReporterError,
    outcome::{HookFailure, NamePath, Summary, TestOutcome},
};

pub mod color;
mod common;

mod collect;
pub use collect::*;

mod no;
pub use no::*;

pub mod pretty;
pub mod terse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStart {
    /// Tests that survived only/skip selection.
    pub scheduled: usize,
    pub filtered_out: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteStart {
    pub path: NamePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFinished {
    pub path: NamePath,
    pub outcome: TestOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTest {
    pub path: NamePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndListing {
    pub selected: usize,
    pub filtered_out: usize,
}

/// Everything a reporter can be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    RunStart(RunStart),
    SuiteStart(SuiteStart),
    TestFinished(TestFinished),
    HookError(HookFailure),
    RunSummary(Summary),
    ListTest(ListTest),
    EndListing(EndListing),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RunStart(_) => "run_start",
            Event::SuiteStart(_) => "suite_start",
            Event::TestFinished(_) => "test_finished",
            Event::HookError(_) => "hook_error",
            Event::RunSummary(_) => "run_summary",
            Event::ListTest(_) => "list_test",
            Event::EndListing(_) => "end_listing",
        }
    }

    fn dispatch(&self, reporter: &mut dyn Reporter) -> io::Result<()> {
        match self {
            Event::RunStart(data) => reporter.fmt_run_start(data),
            Event::SuiteStart(data) => reporter.fmt_suite_start(data),
            Event::TestFinished(data) => reporter.fmt_test_finished(data),
            Event::HookError(data) => reporter.fmt_hook_error(data),
            Event::RunSummary(data) => reporter.fmt_run_summary(data),
            Event::ListTest(data) => reporter.fmt_list_test(data),
            Event::EndListing(data) => reporter.fmt_end_listing(data),
        }
    }
}

/// A sink for run events.
///
/// Reporters run on their own thread, hence the `Send` bound.
pub trait Reporter: Send {
    fn fmt_run_start(&mut self, data: &RunStart) -> io::Result<()> {
        let _ = data;
        Ok(())
    }

    fn fmt_suite_start(&mut self, data: &SuiteStart) -> io::Result<()> {
        let _ = data;
        Ok(())
    }

    fn fmt_test_finished(&mut self, data: &TestFinished) -> io::Result<()> {
        let _ = data;
        Ok(())
    }

    /// A suite-level `before` or `after` hook failed.
    fn fmt_hook_error(&mut self, data: &HookFailure) -> io::Result<()> {
        let _ = data;
        Ok(())
    }

    fn fmt_run_summary(&mut self, data: &Summary) -> io::Result<()> {
        let _ = data;
        Ok(())
    }

    fn fmt_list_test(&mut self, data: &ListTest) -> io::Result<()> {
        let _ = data;
        Ok(())
    }

    fn fmt_end_listing(&mut self, data: &EndListing) -> io::Result<()> {
        let _ = data;
        Ok(())
    }
}

/// The sending half handed to the engine.
#[derive(Debug, Clone)]
pub struct EventSender(crossbeam_channel::Sender<Event>);

impl EventSender {
    /// Send an event, dropping it silently if the reporter thread is gone.
    pub fn send(&self, event: Event) {
        let _ = self.0.send(event);
    }
}

const CHANNEL_CAPACITY: usize = 64;

/// Run `f` while a reporter thread feeds every sent event to `reporters`.
///
/// Returns the value of `f` and every reporter error, in the order they happened.
pub fn with_reporters<R>(
    reporters: &mut [Box<dyn Reporter>],
    f: impl FnOnce(&EventSender) -> R,
) -> (R, Vec<ReporterError>) {
    thread::scope(|scope| {
        let (tx, rx) = crossbeam_channel::bounded::<Event>(CHANNEL_CAPACITY);
        let reporter_thread = scope.spawn(move || {
            let mut errors = Vec::new();
            while let Ok(event) = rx.recv() {
                for (index, reporter) in reporters.iter_mut().enumerate() {
                    if let Err(source) = event.dispatch(reporter.as_mut()) {
                        log::warn!("reporter #{index} failed on {}: {source}", event.name());
                        errors.push(ReporterError {
                            reporter: index,
                            event: event.name(),
                            source,
                        });
                    }
                }
            }
            errors
        });

        let sender = EventSender(tx);
        let value = f(&sender);
        drop(sender);

        let errors = reporter_thread
            .join()
            .expect("reporter thread should join without issues");
        (value, errors)
    })
}
