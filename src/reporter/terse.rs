use std::io;

use crate::{
    outcome::{HookFailure, Summary, TestStatus},
    reporter::{
        color::{ColorSetting, SupportsColor},
        common::{self, Failure},
        *,
    },
};

/// Prints one character per test: `.` passed, `F` failed, `E` errored.
#[derive(Debug)]
pub struct TerseReporter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
    failures: Vec<Failure>,
    scheduled: usize,
    progress: usize,
}

impl Default for TerseReporter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: Default::default(),
            failures: Vec::new(),
            scheduled: 0,
            progress: 0,
        }
    }
}

impl<W: io::Write> TerseReporter<W> {
    pub fn with_target<WithTarget: io::Write>(
        self,
        with_target: WithTarget,
    ) -> TerseReporter<WithTarget> {
        TerseReporter {
            target: with_target,
            color_setting: self.color_setting,
            failures: self.failures,
            scheduled: self.scheduled,
            progress: self.progress,
        }
    }

    pub fn with_color_setting(self, color_setting: impl Into<ColorSetting>) -> Self {
        TerseReporter {
            color_setting: color_setting.into(),
            ..self
        }
    }
}

impl<W: io::Write + Send + SupportsColor> Reporter for TerseReporter<W> {
    fn fmt_run_start(&mut self, data: &RunStart) -> io::Result<()> {
        self.failures.clear();
        self.scheduled = data.scheduled;
        self.progress = 0;
        match data.scheduled {
            1 => writeln!(self.target, "\nrunning 1 test"),
            count => writeln!(self.target, "\nrunning {count} tests"),
        }
    }

    fn fmt_test_finished(&mut self, data: &TestFinished) -> io::Result<()> {
        let mark = match data.outcome.status {
            TestStatus::Passed => '.',
            TestStatus::Failed(_) => 'F',
            TestStatus::Errored(_) => 'E',
        };
        write!(self.target, "{mark}")?;
        self.progress += 1;
        // wrap like libtest does for long runs
        if self.progress % 88 == 0 {
            writeln!(self.target, " {}/{}", self.progress, self.scheduled)?;
        }
        self.failures.extend(Failure::from_finished(data));
        Ok(())
    }

    fn fmt_hook_error(&mut self, data: &HookFailure) -> io::Result<()> {
        self.failures.extend(Failure::from_hook(data));
        Ok(())
    }

    fn fmt_run_summary(&mut self, data: &Summary) -> io::Result<()> {
        if self.progress % 88 != 0 {
            writeln!(self.target)?;
        }
        common::write_failures(&mut self.target, &self.failures)?;
        let use_color = self.color_setting.use_color(&self.target);
        common::write_summary(&mut self.target, data, use_color)
    }

    fn fmt_list_test(&mut self, data: &ListTest) -> io::Result<()> {
        common::write_list_test(&mut self.target, data)
    }

    fn fmt_end_listing(&mut self, data: &EndListing) -> io::Result<()> {
        common::write_end_listing(&mut self.target, data)
    }
}
