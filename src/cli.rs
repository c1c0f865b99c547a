//! The command line front end.
//!
//! A test binary declares its spec files with [`spec_file!`](crate::spec_file)
//! and hands `main` over to kisuite:
//!
//! ```no_run
//! fn main() -> std::process::ExitCode {
//!     kisuite::main()
//! }
//! ```

use std::{
    ffi::OsString,
    process::{ExitCode, Termination},
};

use clap::Parser;

use crate::{
    config::{Config, ReportFormat},
    discover::SPEC_FILES,
    error::{Error, Result},
    reporter::color::ColorSetting,
    session::{CycleOutcome, run_cycle},
};

/// Run the spec files linked into this binary.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
pub struct Args {
    /// Glob patterns selecting spec files by path, all files when empty
    pub patterns: Vec<String>,

    /// Spec files to load before the discovered ones, by exact path
    #[arg(short, long, value_delimiter = ',')]
    pub require: Vec<String>,

    /// Allow spec files that declare through the ambient API
    #[arg(short, long)]
    pub globals: bool,

    /// List the selected tests instead of running them
    #[arg(long)]
    pub list: bool,

    /// How to report results
    #[arg(long, value_enum, default_value_t, env = "KISUITE_FORMAT")]
    pub format: ReportFormat,

    /// When to color the output
    #[arg(long, value_enum, default_value_t, env = "KISUITE_COLOR")]
    pub color: ColorSetting,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            patterns: args.patterns,
            require: args.require,
            globals: args.globals,
            list: args.list,
            format: args.format,
            color: args.color,
        }
    }
}

/// Install the logger, filtered by `KISUITE_LOG`.
pub fn init_logging() {
    let env = env_logger::Env::new().filter_or("KISUITE_LOG", "error");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Parse the process arguments and run one cycle.
pub fn main() -> ExitCode {
    init_logging();
    match run_from(std::env::args_os()) {
        Ok(outcome) => outcome.report(),
        Err(Error::Args(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Run one cycle over the registered spec files with the given arguments.
///
/// The first argument is the binary name, as with [`std::env::args_os`].
pub fn run_from<I, T>(args: I) -> Result<CycleOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::try_parse_from(args)?;
    let config = Config::from(args);
    log::debug!("running with {config:?}");
    run_cycle(&config, &SPEC_FILES)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> Config {
        Args::try_parse_from(std::iter::once("kisuite").chain(args.iter().copied()))
            .map(Config::from)
            .unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(config.patterns, Vec::<String>::new());
        assert!(!config.globals);
        assert!(!config.list);
    }

    #[test]
    fn full_command_line() {
        let config = parse(&[
            "-g",
            "--require",
            "setup.rs,helpers.rs",
            "--format",
            "terse",
            "--color",
            "never",
            "--list",
            "specs/*.rs",
            "other/**/*.rs",
        ]);
        assert_eq!(
            config,
            Config {
                patterns: vec!["specs/*.rs".into(), "other/**/*.rs".into()],
                require: vec!["setup.rs".into(), "helpers.rs".into()],
                globals: true,
                list: true,
                format: ReportFormat::Terse,
                color: ColorSetting::Never,
            }
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = Args::try_parse_from(["kisuite", "--format", "fancy"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn run_from_reports_bad_arguments() {
        let err = run_from(["kisuite", "--no-such-flag"]).unwrap_err();
        assert!(matches!(err, Error::Args(_)));
    }
}
