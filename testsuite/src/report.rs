use std::fmt;

/// Outcome of the evaluation of one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The validator verdict matched the expectation.
    Pass { conforms: bool },
    Fail { expected: bool, actual: bool },
    /// The fixture could not be loaded or validated.
    Error(String),
    /// The fixture is not part of the tally.
    Skip,
}

#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub outcome: Outcome,
}

impl TestResult {
    pub fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }

    /// Builds the outcome of a fixture whose verdict is known.
    pub fn verdict(name: impl Into<String>, expected: bool, actual: bool) -> Self {
        Self::new(
            name,
            if expected == actual {
                Outcome::Pass { conforms: actual }
            } else {
                Outcome::Fail { expected, actual }
            },
        )
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        match &self.outcome {
            Outcome::Pass { conforms } => write!(f, "PASS - {name}: sh:conforms {conforms}"),
            Outcome::Fail { expected, actual } => {
                write!(f, "FAIL - {name}: expected sh:conforms {expected}, got {actual}")
            }
            Outcome::Error(message) => write!(f, "ERROR - {name}: {message}"),
            Outcome::Skip => write!(f, "SKIP - {name}: warning test (warnings treated differently)"),
        }
    }
}

/// Results of a batch of fixtures.
#[derive(Debug, Clone, Default)]
pub struct TestReport {
    title: String,
    shape_triples: Option<usize>,
    results: Vec<TestResult>,
}

impl TestReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            shape_triples: None,
            results: Vec::new(),
        }
    }

    /// Records the size of the merged shapes graph the fixtures were validated against.
    #[must_use]
    pub fn with_shape_triples(mut self, count: usize) -> Self {
        self.shape_triples = Some(count);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn shape_triples(&self) -> Option<usize> {
        self.shape_triples
    }

    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Pass { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Fail { .. }))
    }

    pub fn errors(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Error(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skip))
    }

    /// True when no fixture failed or errored. Skipped fixtures do not count.
    pub fn all_passed(&self) -> bool {
        self.failed() == 0 && self.errors() == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} errors, {} skipped",
            self.passed(),
            self.failed(),
            self.errors(),
            self.skipped()
        )
    }

    fn count(&self, filter: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| filter(&r.outcome)).count()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(count) = self.shape_triples {
            writeln!(f, "Loaded {count} shape triples")?;
        }
        for result in &self.results {
            writeln!(f, "{result}")?;
        }
        writeln!(f, "{}", self.summary())
    }
}
