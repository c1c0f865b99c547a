use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    outcome::{HookFailure, Summary},
    reporter::*,
};

/// A reporter that keeps every event it receives.
///
/// Clones share the same buffer, so one clone can be registered with a session
/// while another is kept around to inspect the events after the run.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter(Arc<Mutex<Vec<Event>>>);

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the events received so far.
    pub fn events(&self) -> Vec<Event> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Name paths and outcomes of all finished tests, in order.
    pub fn finished(&self) -> Vec<TestFinished> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::TestFinished(data) => Some(data),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, event: Event) -> io::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

impl Reporter for CollectingReporter {
    fn fmt_run_start(&mut self, data: &RunStart) -> io::Result<()> {
        self.push(Event::RunStart(*data))
    }

    fn fmt_suite_start(&mut self, data: &SuiteStart) -> io::Result<()> {
        self.push(Event::SuiteStart(data.clone()))
    }

    fn fmt_test_finished(&mut self, data: &TestFinished) -> io::Result<()> {
        self.push(Event::TestFinished(data.clone()))
    }

    fn fmt_hook_error(&mut self, data: &HookFailure) -> io::Result<()> {
        self.push(Event::HookError(data.clone()))
    }

    fn fmt_run_summary(&mut self, data: &Summary) -> io::Result<()> {
        self.push(Event::RunSummary(data.clone()))
    }

    fn fmt_list_test(&mut self, data: &ListTest) -> io::Result<()> {
        self.push(Event::ListTest(data.clone()))
    }

    fn fmt_end_listing(&mut self, data: &EndListing) -> io::Result<()> {
        self.push(Event::EndListing(*data))
    }
}
