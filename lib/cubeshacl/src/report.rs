//! [SHACL validation reports](https://www.w3.org/TR/shacl/#validation-report).

use crate::constraint::ConstraintComponent;
use crate::model::ShapeId;
use crate::path::PropertyPath;
use crate::vocab::sh;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Graph, Literal, NamedNodeRef, Term, Triple};
use std::fmt;

/// Severity of a validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Violation,
    Warning,
    Info,
}

impl Severity {
    pub fn iri(self) -> NamedNodeRef<'static> {
        match self {
            Self::Violation => sh::VIOLATION,
            Self::Warning => sh::WARNING,
            Self::Info => sh::INFO,
        }
    }

    pub fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        if iri == sh::VIOLATION {
            Some(Self::Violation)
        } else if iri == sh::WARNING {
            Some(Self::Warning)
        } else if iri == sh::INFO {
            Some(Self::Info)
        } else {
            None
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Violation => "Violation",
            Self::Warning => "Warning",
            Self::Info => "Info",
        })
    }
}

/// A single validation result.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub focus_node: Term,
    pub result_path: Option<PropertyPath>,
    pub value: Option<Term>,
    pub source_shape: ShapeId,
    pub source_constraint_component: ConstraintComponent,
    pub result_message: Option<String>,
    pub result_severity: Severity,
}

impl ValidationResult {
    pub fn new(
        focus_node: Term,
        source_shape: ShapeId,
        source_constraint_component: ConstraintComponent,
    ) -> Self {
        Self {
            focus_node,
            result_path: None,
            value: None,
            source_shape,
            source_constraint_component,
            result_message: None,
            result_severity: Severity::Violation,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: Option<PropertyPath>) -> Self {
        self.result_path = path;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: Term) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.result_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.result_severity = severity;
        self
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} from {} ({})",
            self.result_severity,
            self.focus_node,
            self.source_shape,
            self.source_constraint_component.iri()
        )?;
        if let Some(path) = &self.result_path {
            write!(f, " path {path}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " value {value}")?;
        }
        if let Some(message) = &self.result_message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// The outcome of a validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the data graph conforms to the shapes, i.e. validation produced no result at all.
    ///
    /// Warnings and infos also make the data non-conforming.
    pub fn conforms(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.results
            .iter()
            .filter(|r| r.result_severity == severity)
            .count()
    }

    pub fn add_result(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    /// Serializes the report with the SHACL report vocabulary.
    pub fn to_graph(&self) -> Graph {
        let mut graph = Graph::new();
        let report = BlankNode::default();
        graph.insert(&Triple::new(
            report.clone(),
            rdf::TYPE,
            sh::VALIDATION_REPORT,
        ));
        graph.insert(&Triple::new(
            report.clone(),
            sh::CONFORMS,
            Literal::new_typed_literal(self.conforms().to_string(), xsd::BOOLEAN),
        ));
        for result in &self.results {
            let node = BlankNode::default();
            graph.insert(&Triple::new(report.clone(), sh::RESULT, node.clone()));
            graph.insert(&Triple::new(node.clone(), rdf::TYPE, sh::VALIDATION_RESULT));
            graph.insert(&Triple::new(
                node.clone(),
                sh::FOCUS_NODE,
                result.focus_node.clone(),
            ));
            if let Some(predicate) = result.result_path.as_ref().and_then(PropertyPath::as_predicate) {
                graph.insert(&Triple::new(node.clone(), sh::RESULT_PATH, predicate.clone()));
            }
            if let Some(value) = &result.value {
                graph.insert(&Triple::new(node.clone(), sh::VALUE, value.clone()));
            }
            graph.insert(&Triple::new(
                node.clone(),
                sh::SOURCE_SHAPE,
                result.source_shape.to_term(),
            ));
            graph.insert(&Triple::new(
                node.clone(),
                sh::SOURCE_CONSTRAINT_COMPONENT,
                result.source_constraint_component.iri(),
            ));
            if let Some(message) = &result.result_message {
                graph.insert(&Triple::new(
                    node.clone(),
                    sh::RESULT_MESSAGE,
                    Literal::new_simple_literal(message),
                ));
            }
            graph.insert(&Triple::new(
                node,
                sh::RESULT_SEVERITY,
                result.result_severity.iri(),
            ));
        }
        graph
    }
}
