//! Finding and registering spec files.
//!
//! Spec files register themselves at link time with [`spec_file!`](crate::spec_file),
//! which adds a [`SpecFile`] to [`SPEC_FILES`]. Discovery never touches the file
//! system: glob patterns are matched against the registered paths, which are the
//! `file!()` paths of the registering source files.

use std::fmt;

use glob::{MatchOptions, Pattern};

use crate::{declare::BuildContext, error::DiscoveryError};

/// How a spec file declares its tests.
#[derive(Clone, Copy)]
pub enum Loader {
    /// Declares through an explicit [`BuildContext`].
    Explicit(fn(&mut BuildContext<'_>)),
    /// Declares through the free functions in [`ambient`](crate::ambient),
    /// loading it requires globals.
    Ambient(fn()),
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loader::Explicit(_) => write!(f, "Explicit(...)"),
            Loader::Ambient(_) => write!(f, "Ambient(...)"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpecFile {
    pub path: &'static str,
    pub loader: Loader,
}

impl SpecFile {
    pub const fn new(path: &'static str, loader: Loader) -> Self {
        Self { path, loader }
    }
}

/// Every spec file linked into the current binary.
#[linkme::distributed_slice]
pub static SPEC_FILES: [SpecFile];

/// Register a spec file.
///
/// The closure-like body becomes the file's loader. With a `|cx|` parameter it
/// receives a [`BuildContext`], without one it uses the ambient API.
///
/// ```ignore
/// kisuite::spec_file!(MATH, |cx| {
///     cx.describe("math", |cx| {
///         cx.it("adds", || assert_eq!(1 + 1, 2));
///     });
/// });
/// ```
#[macro_export]
macro_rules! spec_file {
    ($name:ident, |$cx:ident| $body:block) => {
        #[$crate::linkme::distributed_slice($crate::discover::SPEC_FILES)]
        #[linkme(crate = $crate::linkme)]
        static $name: $crate::discover::SpecFile = $crate::discover::SpecFile::new(
            ::std::file!(),
            $crate::discover::Loader::Explicit({
                fn load($cx: &mut $crate::declare::BuildContext<'_>) $body
                load
            }),
        );
    };
    ($name:ident, || $body:block) => {
        #[$crate::linkme::distributed_slice($crate::discover::SPEC_FILES)]
        #[linkme(crate = $crate::linkme)]
        static $name: $crate::discover::SpecFile = $crate::discover::SpecFile::new(
            ::std::file!(),
            $crate::discover::Loader::Ambient({
                fn load() $body
                load
            }),
        );
    };
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Resolve `patterns` against the spec files linked into this binary.
pub fn discover(patterns: &[String]) -> Result<Vec<&'static SpecFile>, DiscoveryError> {
    discover_in(&SPEC_FILES, patterns)
}

/// Resolve glob `patterns` against `files`.
///
/// No patterns selects every file. The result is sorted by path without
/// duplicates. A pattern that matches nothing is an error.
pub fn discover_in<'f>(
    files: &'f [SpecFile],
    patterns: &[impl AsRef<str>],
) -> Result<Vec<&'f SpecFile>, DiscoveryError> {
    let mut found: Vec<&SpecFile> = match patterns.is_empty() {
        true => files.iter().collect(),
        false => {
            let mut found = Vec::new();
            for pattern in patterns {
                let pattern = pattern.as_ref();
                let compiled =
                    Pattern::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })?;
                let before = found.len();
                found.extend(
                    files
                        .iter()
                        .filter(|file| compiled.matches_with(file.path, MATCH_OPTIONS)),
                );
                if found.len() == before {
                    return Err(DiscoveryError::NoMatch(pattern.to_string()));
                }
            }
            found
        }
    };

    found.sort_by_key(|file| file.path);
    found.dedup_by_key(|file| file.path);
    log::debug!("discovered {} spec files", found.len());
    Ok(found)
}

/// Look up required files by exact path, keeping the given order.
pub fn resolve_required<'f>(
    files: &'f [SpecFile],
    paths: &[impl AsRef<str>],
) -> Result<Vec<&'f SpecFile>, DiscoveryError> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            files
                .iter()
                .find(|file| file.path == path)
                .ok_or_else(|| DiscoveryError::UnknownRequire(path.to_string()))
        })
        .collect()
}
