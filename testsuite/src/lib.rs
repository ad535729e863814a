//! Conformance harness checking cube-link SHACL profiles against their Turtle fixtures.
//!
//! A profile `<name>` is made of the shape document `validation/<name>.ttl`, which may pull
//! other shape documents in with `code:imports`, and of the fixtures in `test/<name>/`.
//! Fixture names encode the expected verdict, see [`expectation::classify`].

pub mod evaluator;
pub mod expectation;
pub mod files;
pub mod report;

use crate::evaluator::ProfileRun;
use anyhow::{Result, bail};
use std::path::Path;

/// Runs a profile and fails if any of its fixtures did not pass.
pub fn check_profile(root: &Path, profile: &str) -> Result<()> {
    let report = ProfileRun::new(root, profile).evaluate()?;
    let errors = report
        .results()
        .iter()
        .filter(|r| {
            !matches!(
                r.outcome,
                report::Outcome::Pass { .. } | report::Outcome::Skip
            )
        })
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        bail!("{} failing fixtures:\n{}\n", errors.len(), errors.join("\n"));
    }
    Ok(())
}
