//! SHACL Core constraints.

use crate::model::ShapeId;
use crate::vocab::sh;
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term};

/// A constraint declared by a shape, with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Class(NamedNode),
    Datatype(NamedNode),
    NodeKind(NodeKind),
    MinCount(usize),
    MaxCount(usize),
    MinExclusive(Literal),
    MaxExclusive(Literal),
    MinInclusive(Literal),
    MaxInclusive(Literal),
    MinLength(usize),
    MaxLength(usize),
    Pattern {
        pattern: String,
        flags: Option<String>,
    },
    LanguageIn(Vec<String>),
    UniqueLang,
    Equals(NamedNode),
    Disjoint(NamedNode),
    LessThan(NamedNode),
    LessThanOrEquals(NamedNode),
    Not(ShapeId),
    And(Vec<ShapeId>),
    Or(Vec<ShapeId>),
    Xone(Vec<ShapeId>),
    Node(ShapeId),
    /// `sh:property`: the value nodes are validated against a property shape.
    Property(ShapeId),
    QualifiedValueShape {
        shape: ShapeId,
        min_count: Option<usize>,
        max_count: Option<usize>,
        /// Qualified value shapes of the sibling property shapes when `sh:qualifiedValueShapesDisjoint` is set.
        siblings: Vec<ShapeId>,
    },
    Closed {
        ignored_properties: Vec<NamedNode>,
    },
    HasValue(Term),
    In(Vec<Term>),
}

/// Value of `sh:nodeKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Iri,
    Literal,
    BlankNode,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    pub fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        Some(match iri {
            k if k == sh::IRI => Self::Iri,
            k if k == sh::LITERAL => Self::Literal,
            k if k == sh::BLANK_NODE => Self::BlankNode,
            k if k == sh::BLANK_NODE_OR_IRI => Self::BlankNodeOrIri,
            k if k == sh::BLANK_NODE_OR_LITERAL => Self::BlankNodeOrLiteral,
            k if k == sh::IRI_OR_LITERAL => Self::IriOrLiteral,
            _ => return None,
        })
    }

    pub fn matches(self, term: &Term) -> bool {
        match term {
            Term::NamedNode(_) => matches!(self, Self::Iri | Self::BlankNodeOrIri | Self::IriOrLiteral),
            Term::BlankNode(_) => matches!(
                self,
                Self::BlankNode | Self::BlankNodeOrIri | Self::BlankNodeOrLiteral
            ),
            Term::Literal(_) => matches!(
                self,
                Self::Literal | Self::BlankNodeOrLiteral | Self::IriOrLiteral
            ),
            _ => false,
        }
    }
}

/// The constraint component a validation result originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintComponent {
    Class,
    Datatype,
    NodeKind,
    MinCount,
    MaxCount,
    MinExclusive,
    MaxExclusive,
    MinInclusive,
    MaxInclusive,
    MinLength,
    MaxLength,
    Pattern,
    LanguageIn,
    UniqueLang,
    Equals,
    Disjoint,
    LessThan,
    LessThanOrEquals,
    Not,
    And,
    Or,
    Xone,
    Node,
    Property,
    QualifiedMinCount,
    QualifiedMaxCount,
    Closed,
    HasValue,
    In,
}

impl ConstraintComponent {
    pub fn iri(self) -> NamedNodeRef<'static> {
        match self {
            Self::Class => sh::CLASS_CONSTRAINT_COMPONENT,
            Self::Datatype => sh::DATATYPE_CONSTRAINT_COMPONENT,
            Self::NodeKind => sh::NODE_KIND_CONSTRAINT_COMPONENT,
            Self::MinCount => sh::MIN_COUNT_CONSTRAINT_COMPONENT,
            Self::MaxCount => sh::MAX_COUNT_CONSTRAINT_COMPONENT,
            Self::MinExclusive => sh::MIN_EXCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MaxExclusive => sh::MAX_EXCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MinInclusive => sh::MIN_INCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MaxInclusive => sh::MAX_INCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MinLength => sh::MIN_LENGTH_CONSTRAINT_COMPONENT,
            Self::MaxLength => sh::MAX_LENGTH_CONSTRAINT_COMPONENT,
            Self::Pattern => sh::PATTERN_CONSTRAINT_COMPONENT,
            Self::LanguageIn => sh::LANGUAGE_IN_CONSTRAINT_COMPONENT,
            Self::UniqueLang => sh::UNIQUE_LANG_CONSTRAINT_COMPONENT,
            Self::Equals => sh::EQUALS_CONSTRAINT_COMPONENT,
            Self::Disjoint => sh::DISJOINT_CONSTRAINT_COMPONENT,
            Self::LessThan => sh::LESS_THAN_CONSTRAINT_COMPONENT,
            Self::LessThanOrEquals => sh::LESS_THAN_OR_EQUALS_CONSTRAINT_COMPONENT,
            Self::Not => sh::NOT_CONSTRAINT_COMPONENT,
            Self::And => sh::AND_CONSTRAINT_COMPONENT,
            Self::Or => sh::OR_CONSTRAINT_COMPONENT,
            Self::Xone => sh::XONE_CONSTRAINT_COMPONENT,
            Self::Node => sh::NODE_CONSTRAINT_COMPONENT,
            Self::Property => sh::PROPERTY_CONSTRAINT_COMPONENT,
            Self::QualifiedMinCount => sh::QUALIFIED_MIN_COUNT_CONSTRAINT_COMPONENT,
            Self::QualifiedMaxCount => sh::QUALIFIED_MAX_COUNT_CONSTRAINT_COMPONENT,
            Self::Closed => sh::CLOSED_CONSTRAINT_COMPONENT,
            Self::HasValue => sh::HAS_VALUE_CONSTRAINT_COMPONENT,
            Self::In => sh::IN_CONSTRAINT_COMPONENT,
        }
    }
}
