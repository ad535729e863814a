//! The conformance verdict a fixture is expected to get, encoded in its file name.

/// Expected outcome of validating a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// `valid*` fixtures must conform.
    Conforms,
    /// `invalid*`, `warning*` and any other fixture must not conform.
    Violates,
    /// `valid*warning*` fixtures are left out of the tally: the validator reports
    /// warnings as non-conformance while the tested pipeline accepts them.
    Skipped,
}

impl Expectation {
    /// The expected `sh:conforms` value, if the fixture is evaluated at all.
    pub fn conforms(self) -> Option<bool> {
        match self {
            Self::Conforms => Some(true),
            Self::Violates => Some(false),
            Self::Skipped => None,
        }
    }
}

/// Classifies a fixture from its file name.
///
/// ```
/// use cube_link_testsuite::expectation::{Expectation, classify};
///
/// assert_eq!(classify("valid-cube.ttl"), Expectation::Conforms);
/// assert_eq!(classify("invalid-cube.ttl"), Expectation::Violates);
/// assert_eq!(classify("valid-with-warning.ttl"), Expectation::Skipped);
/// ```
pub fn classify(file_name: &str) -> Expectation {
    if !file_name.starts_with("valid") {
        Expectation::Violates
    } else if file_name.contains("warning") {
        Expectation::Skipped
    } else {
        Expectation::Conforms
    }
}
