use std::io;

use crate::{
    outcome::{HookFailure, Summary, TestStatus, display_path},
    reporter::{
        color::{ColorSetting, SupportsColor, colors::*},
        common::{self, Failure},
        *,
    },
};

/// Prints one line per test, then failure details and a summary.
///
/// ```text
/// running 2 tests
/// test math > adds ... ok
/// test math > divides ... FAILED
/// ```
#[derive(Debug)]
pub struct PrettyReporter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
    failures: Vec<Failure>,
}

impl Default for PrettyReporter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: Default::default(),
            failures: Vec::new(),
        }
    }
}

impl<W: io::Write> PrettyReporter<W> {
    pub fn with_target<WithTarget: io::Write>(
        self,
        with_target: WithTarget,
    ) -> PrettyReporter<WithTarget> {
        PrettyReporter {
            target: with_target,
            color_setting: self.color_setting,
            failures: self.failures,
        }
    }

    pub fn with_color_setting(self, color_setting: impl Into<ColorSetting>) -> Self {
        PrettyReporter {
            color_setting: color_setting.into(),
            ..self
        }
    }
}

impl<W: io::Write + SupportsColor> PrettyReporter<W> {
    /// Return whether this reporter will currently emit colored output.
    pub fn use_color(&self) -> bool {
        self.color_setting.use_color(&self.target)
    }
}

impl<W: io::Write + Send + SupportsColor> Reporter for PrettyReporter<W> {
    fn fmt_run_start(&mut self, data: &RunStart) -> io::Result<()> {
        self.failures.clear();
        match data.scheduled {
            1 => writeln!(self.target, "\nrunning 1 test"),
            count => writeln!(self.target, "\nrunning {count} tests"),
        }
    }

    fn fmt_test_finished(&mut self, data: &TestFinished) -> io::Result<()> {
        let name = display_path(&data.path);
        let (label, color) = match data.outcome.status {
            TestStatus::Passed => ("ok", GREEN),
            TestStatus::Failed(_) => ("FAILED", RED),
            TestStatus::Errored(_) => ("ERROR", YELLOW),
        };
        match self.use_color() {
            true => writeln!(self.target, "test {name} ... {color}{label}{RESET}")?,
            false => writeln!(self.target, "test {name} ... {label}")?,
        }
        self.failures.extend(Failure::from_finished(data));
        Ok(())
    }

    fn fmt_hook_error(&mut self, data: &HookFailure) -> io::Result<()> {
        self.failures.extend(Failure::from_hook(data));
        writeln!(self.target, "hook error: {data}")
    }

    fn fmt_run_summary(&mut self, data: &Summary) -> io::Result<()> {
        common::write_failures(&mut self.target, &self.failures)?;
        let use_color = self.use_color();
        common::write_summary(&mut self.target, data, use_color)
    }

    fn fmt_list_test(&mut self, data: &ListTest) -> io::Result<()> {
        common::write_list_test(&mut self.target, data)
    }

    fn fmt_end_listing(&mut self, data: &EndListing) -> io::Result<()> {
        common::write_end_listing(&mut self.target, data)
    }
}
