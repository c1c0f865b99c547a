//! Errors surfaced to the operator.
//!
//! Failing tests and hooks are not errors in this sense, they end up as
//! [`TestStatus`](crate::outcome::TestStatus) values in the run report.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("pattern {0:?} did not match any registered spec file")]
    NoMatch(String),

    #[error("required file {0:?} is not a registered spec file")]
    UnknownRequire(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("loading {path} panicked: {message}")]
    Panicked { path: String, message: String },

    #[error("{path} uses the ambient declaration API, enable globals to load it")]
    GlobalsRequired { path: String },
}

/// A reporter could not write an event.
#[derive(Debug, Error)]
#[error("reporter #{reporter} failed on {event}: {source}")]
pub struct ReporterError {
    /// Position of the reporter in the session.
    pub reporter: usize,
    pub event: &'static str,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Args(#[from] clap::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
