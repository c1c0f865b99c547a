use std::process::{ExitCode, Termination};

use crate::{
    error::ReporterError,
    outcome::{NamePath, Summary, SuiteOutcome, TestOutcome},
};

/// Everything a finished run produced.
#[derive(Debug)]
#[non_exhaustive]
pub struct RunReport {
    pub root: SuiteOutcome,
    pub summary: Summary,
    pub reporter_errors: Vec<ReporterError>,
}

impl RunReport {
    /// Every test outcome, in execution order.
    pub fn outcomes(&self) -> Vec<(&NamePath, &TestOutcome)> {
        self.root.tests()
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.summary.is_success() {
            true => ExitCode::SUCCESS,
            false => ExitCode::FAILURE,
        }
    }
}

impl Termination for RunReport {
    fn report(self) -> ExitCode {
        self.exit_code()
    }
}

/// The result of listing instead of running.
#[derive(Debug)]
#[non_exhaustive]
pub struct ListReport {
    pub tests: Vec<NamePath>,
    pub filtered_out: usize,
    pub reporter_errors: Vec<ReporterError>,
}

impl Termination for ListReport {
    fn report(self) -> ExitCode {
        ExitCode::SUCCESS
    }
}
