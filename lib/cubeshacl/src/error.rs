use oxrdf::{NamedNode, Term};

/// An error raised while building or running a validator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShaclError {
    #[error(transparent)]
    Parse(#[from] ShaclParseError),
    #[error(transparent)]
    Validation(#[from] ShaclValidationError),
}

/// A malformed shape definition.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShaclParseError {
    #[error("Invalid shape {shape}: {message}")]
    InvalidShape { shape: Term, message: String },
    #[error("Invalid value {actual} for {property} in shape {shape}: expected {expected}")]
    InvalidPropertyValue {
        shape: Term,
        property: NamedNode,
        expected: &'static str,
        actual: Term,
    },
    #[error("Invalid property path in shape {shape}: {message}")]
    InvalidPropertyPath { shape: Term, message: String },
    #[error("Invalid RDF list in shape {shape}: {message}")]
    InvalidRdfList { shape: Term, message: String },
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

impl ShaclParseError {
    pub(crate) fn invalid_shape(shape: impl Into<Term>, message: impl Into<String>) -> Self {
        Self::InvalidShape {
            shape: shape.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_property_value(
        shape: impl Into<Term>,
        property: impl Into<NamedNode>,
        expected: &'static str,
        actual: impl Into<Term>,
    ) -> Self {
        Self::InvalidPropertyValue {
            shape: shape.into(),
            property: property.into(),
            expected,
            actual: actual.into(),
        }
    }

    pub(crate) fn invalid_property_path(
        shape: impl Into<Term>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPropertyPath {
            shape: shape.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_rdf_list(shape: impl Into<Term>, message: impl Into<String>) -> Self {
        Self::InvalidRdfList {
            shape: shape.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_regex(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// An error raised while validating a data graph.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShaclValidationError {
    #[error("Maximum shape nesting depth ({depth}) exceeded during validation")]
    MaxRecursionDepth { depth: usize },
}
