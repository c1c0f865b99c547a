use crate::reporter::Reporter;

/// A reporter that produces no output.
///
/// `NoReporter` accepts every event and discards it. This is useful when the
/// caller only cares about the returned [`RunReport`](crate::report::RunReport),
/// for example when embedding kisuite into a system with its own reporting.
#[derive(Debug, Default, Clone)]
pub struct NoReporter;

impl Reporter for NoReporter {}
