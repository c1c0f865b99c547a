//! Output shared by the human readable reporters.

use std::io;

use crate::{
    outcome::{HookFailure, Summary, TestStatus, display_path},
    reporter::{EndListing, ListTest, TestFinished, color::colors::*},
    tree::HookKind,
};

/// A test that did not pass, remembered until the summary is written.
#[derive(Debug, Clone)]
pub(crate) struct Failure {
    pub name: String,
    pub message: String,
}

impl Failure {
    pub fn from_finished(data: &TestFinished) -> Option<Self> {
        let message = match &data.outcome.status {
            TestStatus::Passed => return None,
            TestStatus::Failed(failure) => failure.to_string(),
            TestStatus::Errored(hook) => hook.to_string(),
        };
        Some(Failure {
            name: display_path(&data.path),
            message,
        })
    }

    /// A failed `after` hook. Failed `before` hooks already show up through
    /// the tests they errored.
    pub fn from_hook(data: &HookFailure) -> Option<Self> {
        if data.kind != HookKind::After {
            return None;
        }
        let suite = match data.suite.is_empty() {
            true => "root suite".to_string(),
            false => display_path(&data.suite),
        };
        Some(Failure {
            name: format!("{suite} (after hook)"),
            message: data.error.to_string(),
        })
    }
}

pub(crate) fn write_failures(target: &mut impl io::Write, failures: &[Failure]) -> io::Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    writeln!(target)?;
    writeln!(target, "failures:")?;
    writeln!(target)?;
    for failure in failures {
        writeln!(target, "---- {} ----", failure.name)?;
        writeln!(target, "{}", failure.message)?;
        writeln!(target)?;
    }
    writeln!(target, "failures:")?;
    for failure in failures {
        writeln!(target, "    {}", failure.name)?;
    }
    Ok(())
}

pub(crate) fn write_summary(
    target: &mut impl io::Write,
    summary: &Summary,
    use_color: bool,
) -> io::Result<()> {
    let Summary {
        passed,
        failed,
        errored,
        hook_errors,
        filtered_out,
        duration,
        ..
    } = summary;

    writeln!(target)?;
    write!(target, "test result: ")?;
    match (summary.is_success(), use_color) {
        (true, false) => write!(target, "ok. ")?,
        (true, true) => write!(target, "{GREEN}ok{RESET}. ")?,
        (false, false) => write!(target, "FAILED. ")?,
        (false, true) => write!(target, "{RED}FAILED{RESET}. ")?,
    }
    writeln!(
        target,
        "{passed} passed; {failed} failed; {errored} errored; {hook_errors} hook errors; {filtered_out} filtered out; finished in {:.2}s",
        duration.as_secs_f64()
    )?;
    writeln!(target)
}

pub(crate) fn write_list_test(target: &mut impl io::Write, data: &ListTest) -> io::Result<()> {
    writeln!(target, "{}: test", display_path(&data.path))
}

pub(crate) fn write_end_listing(target: &mut impl io::Write, data: &EndListing) -> io::Result<()> {
    match data.selected {
        1 => writeln!(target, "\n1 test")?,
        count => writeln!(target, "\n{count} tests")?,
    }
    if data.filtered_out > 0 {
        writeln!(target, "{} filtered out", data.filtered_out)?;
    }
    Ok(())
}
