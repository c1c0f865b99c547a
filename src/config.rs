use crate::reporter::{
    NoReporter, Reporter, color::ColorSetting, pretty::PrettyReporter, terse::TerseReporter,
};

/// Which reporter a cycle prints with.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    /// One line per test.
    #[default]
    Pretty,
    /// One character per test.
    Terse,
    /// No output, only the exit code.
    None,
}

/// Resolved configuration for one run cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Glob patterns over registered spec file paths, empty means all.
    pub patterns: Vec<String>,
    /// Exact paths loaded before the discovered files.
    pub require: Vec<String>,
    pub globals: bool,
    /// List selected tests instead of running them.
    pub list: bool,
    pub format: ReportFormat,
    pub color: ColorSetting,
}

impl Config {
    pub fn reporter(&self) -> Box<dyn Reporter> {
        match self.format {
            ReportFormat::Pretty => {
                Box::new(PrettyReporter::default().with_color_setting(self.color))
            }
            ReportFormat::Terse => Box::new(TerseReporter::default().with_color_setting(self.color)),
            ReportFormat::None => Box::new(NoReporter),
        }
    }
}
