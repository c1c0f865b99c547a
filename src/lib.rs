pub mod action;
pub mod ambient;
pub mod config;
pub mod declare;
pub mod discover;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod report;
pub mod reporter;
pub mod session;
pub mod tree;

mod cli;
pub use cli::*;

#[doc(hidden)]
pub use linkme;

/// The names a spec file usually needs.
pub mod prelude {
    pub use crate::{
        action::{ActionHandle, ActionResult},
        declare::BuildContext,
        session::Session,
    };
}

#[cfg(test)]
mod test_support;
