use crate::expectation::classify;
use crate::files::{display_name, fixture_files, fixtures_dir, load_graph, shapes_path};
use crate::report::{Outcome, TestReport, TestResult};
use anyhow::{Context, Result};
use cubeshacl::{ShaclValidator, ShapesGraph};
use cubeshapes::ShapesLoader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Profiles of the cube-link repository, listed in the usage message.
pub const KNOWN_PROFILES: [&str; 5] = [
    "basic-cube-constraint",
    "standalone-constraint-constraint",
    "profile-visualize",
    "profile-opendataswiss",
    "profile-opendataswiss-lindas",
];

/// Observation fixtures and their expected `sh:conforms` value.
///
/// Each of them holds both the shapes and the data to validate.
pub const OBSERVATION_CASES: [(&str, bool); 5] = [
    ("undefinedAllowed.ttl", true),
    ("undefinedNotAllowed.ttl", false),
    ("undefinedOrBounded.ttl", true),
    ("withoutName.ttl", true),
    ("withoutType.ttl", true),
];

/// Validates the fixtures of a profile against its merged shapes.
#[derive(Debug, Clone)]
pub struct ProfileRun {
    root: PathBuf,
    profile: String,
    loader: ShapesLoader,
}

impl ProfileRun {
    pub fn new(root: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            profile: profile.into(),
            loader: ShapesLoader::new(),
        }
    }

    /// Fails the run when an imported shape document is missing.
    #[must_use]
    pub fn strict_imports(mut self) -> Self {
        self.loader = self.loader.strict();
        self
    }

    pub fn shapes_path(&self) -> PathBuf {
        shapes_path(&self.root, &self.profile)
    }

    pub fn fixtures_dir(&self) -> PathBuf {
        fixtures_dir(&self.root, &self.profile)
    }

    /// Loads the shapes and evaluates every fixture.
    ///
    /// Loading the shapes and listing the fixtures are fatal, failures of single fixtures are not.
    pub fn evaluate(&self) -> Result<TestReport> {
        let shapes_path = self.shapes_path();
        let shapes = self
            .loader
            .load(&shapes_path)
            .with_context(|| format!("Failed to load the shapes of profile {}", self.profile))?;
        info!(
            "Loaded {} shape triples for profile {} from {}",
            shapes.len(),
            self.profile,
            shapes_path.display()
        );
        let validator = ShaclValidator::new(
            ShapesGraph::from_graph(&shapes)
                .with_context(|| format!("Invalid shapes in {}", shapes_path.display()))?,
        );
        let fixtures = fixture_files(&self.fixtures_dir())?;
        let mut report = TestReport::new(format!("Testing profile: {}", self.profile))
            .with_shape_triples(shapes.len());
        for fixture in &fixtures {
            report.push(evaluate_fixture(&validator, fixture));
        }
        Ok(report)
    }
}

/// Validates one data fixture and compares the verdict with its file name.
pub fn evaluate_fixture(validator: &ShaclValidator, path: &Path) -> TestResult {
    let name = display_name(path);
    let Some(expected) = classify(&name).conforms() else {
        debug!("Skipping {name}");
        return TestResult::new(name, Outcome::Skip);
    };
    match conforms(validator, path) {
        Ok(actual) => TestResult::verdict(name, expected, actual),
        Err(e) => TestResult::new(name, Outcome::Error(format!("{e:#}"))),
    }
}

fn conforms(validator: &ShaclValidator, path: &Path) -> Result<bool> {
    let data = load_graph(path)?;
    let report = validator.validate(&data)?;
    debug!(
        "{} validation results for {}",
        report.results().len(),
        path.display()
    );
    Ok(report.conforms())
}

/// Validates each observation fixture of `<root>/test/observations/` against itself.
pub fn evaluate_observations(root: &Path) -> TestReport {
    let dir = root.join("test").join("observations");
    let mut report = TestReport::new("Observations");
    for (name, expected) in OBSERVATION_CASES {
        let outcome = self_conforms(&dir.join(name));
        report.push(match outcome {
            Ok(actual) => TestResult::verdict(name, expected, actual),
            Err(e) => TestResult::new(name, Outcome::Error(format!("{e:#}"))),
        });
    }
    report
}

fn self_conforms(path: &Path) -> Result<bool> {
    let graph = load_graph(path)?;
    let shapes = ShapesGraph::from_graph(&graph)
        .with_context(|| format!("Invalid shapes in {}", path.display()))?;
    Ok(ShaclValidator::new(shapes).validate(&graph)?.conforms())
}
