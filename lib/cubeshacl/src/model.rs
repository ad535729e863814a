//! Shapes and their discovery in a shapes graph.

use crate::constraint::{Constraint, NodeKind};
use crate::error::ShaclParseError;
use crate::graph::{object, objects, rdf_list, subclasses, subjects};
use crate::path::PropertyPath;
use crate::report::Severity;
use crate::value::compile_pattern;
use crate::vocab::sh;
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{BlankNode, Graph, Literal, NamedNode, NamedNodeRef, Term};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use tracing::debug;

/// Identifier of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Named(NamedNode),
    Blank(BlankNode),
}

impl ShapeId {
    pub fn to_term(&self) -> Term {
        match self {
            Self::Named(n) => n.clone().into(),
            Self::Blank(b) => b.clone().into(),
        }
    }
}

impl From<NamedNode> for ShapeId {
    fn from(n: NamedNode) -> Self {
        Self::Named(n)
    }
}

impl From<BlankNode> for ShapeId {
    fn from(b: BlankNode) -> Self {
        Self::Blank(b)
    }
}

impl TryFrom<Term> for ShapeId {
    type Error = ShaclParseError;

    fn try_from(term: Term) -> Result<Self, ShaclParseError> {
        match term {
            Term::NamedNode(n) => Ok(Self::Named(n)),
            Term::BlankNode(b) => Ok(Self::Blank(b)),
            _ => Err(ShaclParseError::invalid_shape(
                term,
                "a shape must be an IRI or a blank node",
            )),
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::Blank(b) => write!(f, "{b}"),
        }
    }
}

/// Target declaration selecting focus nodes in a data graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `sh:targetClass` or an implicit class target.
    Class(NamedNode),
    Node(Term),
    SubjectsOf(NamedNode),
    ObjectsOf(NamedNode),
}

impl Target {
    pub fn find_focus_nodes(&self, graph: &Graph) -> Vec<Term> {
        match self {
            Self::Class(class) => subclasses(graph, class.as_ref())
                .iter()
                .flat_map(|class| subjects(graph, rdf::TYPE, class.as_ref()))
                .collect(),
            Self::Node(node) => vec![node.clone()],
            Self::SubjectsOf(predicate) => graph
                .triples_for_predicate(predicate)
                .map(|t| t.subject.into_owned().into())
                .collect(),
            Self::ObjectsOf(predicate) => graph
                .triples_for_predicate(predicate)
                .map(|t| t.object.into_owned())
                .collect(),
        }
    }
}

/// A node shape, or a property shape when it has a path.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    pub path: Option<PropertyPath>,
    pub targets: Vec<Target>,
    pub constraints: Vec<Constraint>,
    pub severity: Severity,
    pub deactivated: bool,
    pub message: Option<String>,
    pub name: Option<String>,
}

impl Shape {
    pub fn new(id: ShapeId) -> Self {
        Self {
            id,
            path: None,
            targets: Vec::new(),
            constraints: Vec::new(),
            severity: Severity::Violation,
            deactivated: false,
            message: None,
            name: None,
        }
    }

    pub fn is_property_shape(&self) -> bool {
        self.path.is_some()
    }

    /// Shapes this shape refers to through its constraints.
    pub fn references(&self) -> Vec<&ShapeId> {
        let mut references = Vec::new();
        for constraint in &self.constraints {
            match constraint {
                Constraint::Not(id) | Constraint::Node(id) | Constraint::Property(id) => {
                    references.push(id);
                }
                Constraint::And(ids) | Constraint::Or(ids) | Constraint::Xone(ids) => {
                    references.extend(ids);
                }
                Constraint::QualifiedValueShape {
                    shape, siblings, ..
                } => {
                    references.push(shape);
                    references.extend(siblings);
                }
                _ => (),
            }
        }
        references
    }
}

/// The shapes found in a shapes graph.
#[derive(Debug, Clone, Default)]
pub struct ShapesGraph {
    shapes: FxHashMap<ShapeId, Shape>,
    order: Vec<ShapeId>,
}

impl ShapesGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every shape of `graph`.
    ///
    /// Shapes are the instances of `sh:NodeShape` and `sh:PropertyShape`, the subjects of target
    /// declarations and every node referenced as a shape by another shape.
    pub fn from_graph(graph: &Graph) -> Result<Self, ShaclParseError> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        for class in [sh::NODE_SHAPE, sh::PROPERTY_SHAPE] {
            for subject in subjects(graph, rdf::TYPE, class.into()) {
                let id = ShapeId::try_from(subject)?;
                if seen.insert(id.clone()) {
                    order.push(id);
                }
            }
        }
        for predicate in [
            sh::TARGET_CLASS,
            sh::TARGET_NODE,
            sh::TARGET_SUBJECTS_OF,
            sh::TARGET_OBJECTS_OF,
        ] {
            for triple in graph.triples_for_predicate(predicate) {
                let id = ShapeId::try_from(Term::from(triple.subject.into_owned()))?;
                if seen.insert(id.clone()) {
                    order.push(id);
                }
            }
        }

        let mut shapes = FxHashMap::default();
        let mut i = 0;
        while let Some(id) = order.get(i).cloned() {
            let shape = parse_shape(graph, &id)?;
            for reference in shape.references() {
                if seen.insert(reference.clone()) {
                    order.push(reference.clone());
                }
            }
            shapes.insert(id, shape);
            i += 1;
        }
        debug!("Found {} shapes", order.len());
        Ok(Self { shapes, order })
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Iterates over the shapes in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.order.iter().filter_map(|id| self.shapes.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn parse_shape(graph: &Graph, id: &ShapeId) -> Result<Shape, ShaclParseError> {
    let term = id.to_term();
    let mut shape = Shape::new(id.clone());
    shape.path = object(graph, &term, sh::PATH)
        .map(|path| PropertyPath::parse(graph, &path))
        .transpose()?;
    parse_targets(graph, &term, &mut shape)?;
    parse_constraints(graph, &term, &mut shape)?;

    shape.deactivated = boolean(graph, &term, sh::DEACTIVATED)?.unwrap_or(false);
    if let Some(severity) = object(graph, &term, sh::SEVERITY) {
        shape.severity = match &severity {
            Term::NamedNode(iri) => Severity::from_iri(iri.as_ref()),
            _ => None,
        }
        .ok_or_else(|| {
            ShaclParseError::invalid_property_value(
                term.clone(),
                sh::SEVERITY,
                "a severity",
                severity,
            )
        })?;
    }
    shape.message = string(graph, &term, sh::MESSAGE);
    shape.name = string(graph, &term, sh::NAME);
    Ok(shape)
}

fn parse_targets(graph: &Graph, term: &Term, shape: &mut Shape) -> Result<(), ShaclParseError> {
    for class in iris(graph, term, sh::TARGET_CLASS)? {
        shape.targets.push(Target::Class(class));
    }
    for node in objects(graph, term, sh::TARGET_NODE) {
        shape.targets.push(Target::Node(node));
    }
    for predicate in iris(graph, term, sh::TARGET_SUBJECTS_OF)? {
        shape.targets.push(Target::SubjectsOf(predicate));
    }
    for predicate in iris(graph, term, sh::TARGET_OBJECTS_OF)? {
        shape.targets.push(Target::ObjectsOf(predicate));
    }
    // Implicit class target
    if let Term::NamedNode(iri) = term {
        let types = objects(graph, term, rdf::TYPE);
        let is_shape = types.iter().any(|t| {
            *t == Term::from(sh::NODE_SHAPE.into_owned())
                || *t == Term::from(sh::PROPERTY_SHAPE.into_owned())
        });
        if is_shape && types.contains(&rdfs::CLASS.into_owned().into()) {
            shape.targets.push(Target::Class(iri.clone()));
        }
    }
    Ok(())
}

fn parse_constraints(graph: &Graph, term: &Term, shape: &mut Shape) -> Result<(), ShaclParseError> {
    let constraints = &mut shape.constraints;

    for class in iris(graph, term, sh::CLASS)? {
        constraints.push(Constraint::Class(class));
    }
    for datatype in iris(graph, term, sh::DATATYPE)? {
        constraints.push(Constraint::Datatype(datatype));
    }
    for kind in iris(graph, term, sh::NODE_KIND)? {
        let kind = NodeKind::from_iri(kind.as_ref()).ok_or_else(|| {
            ShaclParseError::invalid_property_value(term.clone(), sh::NODE_KIND, "a node kind", kind)
        })?;
        constraints.push(Constraint::NodeKind(kind));
    }

    if let Some(min) = count(graph, term, sh::MIN_COUNT)? {
        constraints.push(Constraint::MinCount(min));
    }
    if let Some(max) = count(graph, term, sh::MAX_COUNT)? {
        constraints.push(Constraint::MaxCount(max));
    }
    let bounds: [(NamedNodeRef<'_>, fn(Literal) -> Constraint); 4] = [
        (sh::MIN_EXCLUSIVE, Constraint::MinExclusive),
        (sh::MIN_INCLUSIVE, Constraint::MinInclusive),
        (sh::MAX_EXCLUSIVE, Constraint::MaxExclusive),
        (sh::MAX_INCLUSIVE, Constraint::MaxInclusive),
    ];
    for (predicate, build) in bounds {
        for bound in objects(graph, term, predicate) {
            let Term::Literal(bound) = bound else {
                return Err(ShaclParseError::invalid_property_value(
                    term.clone(),
                    predicate,
                    "a literal",
                    bound,
                ));
            };
            constraints.push(build(bound));
        }
    }
    if let Some(min) = count(graph, term, sh::MIN_LENGTH)? {
        constraints.push(Constraint::MinLength(min));
    }
    if let Some(max) = count(graph, term, sh::MAX_LENGTH)? {
        constraints.push(Constraint::MaxLength(max));
    }

    let flags = string(graph, term, sh::FLAGS);
    for pattern in objects(graph, term, sh::PATTERN) {
        let Term::Literal(pattern) = pattern else {
            return Err(ShaclParseError::invalid_property_value(
                term.clone(),
                sh::PATTERN,
                "a string literal",
                pattern,
            ));
        };
        compile_pattern(pattern.value(), flags.as_deref())?;
        constraints.push(Constraint::Pattern {
            pattern: pattern.value().to_owned(),
            flags: flags.clone(),
        });
    }
    if let Some(list) = object(graph, term, sh::LANGUAGE_IN) {
        let mut languages = Vec::new();
        for language in rdf_list(graph, list, term)? {
            let Term::Literal(language) = language else {
                return Err(ShaclParseError::invalid_property_value(
                    term.clone(),
                    sh::LANGUAGE_IN,
                    "a list of language tags",
                    language,
                ));
            };
            languages.push(language.value().to_owned());
        }
        constraints.push(Constraint::LanguageIn(languages));
    }
    if boolean(graph, term, sh::UNIQUE_LANG)? == Some(true) {
        constraints.push(Constraint::UniqueLang);
    }

    let pairs: [(NamedNodeRef<'_>, fn(NamedNode) -> Constraint); 4] = [
        (sh::EQUALS, Constraint::Equals),
        (sh::DISJOINT, Constraint::Disjoint),
        (sh::LESS_THAN, Constraint::LessThan),
        (sh::LESS_THAN_OR_EQUALS, Constraint::LessThanOrEquals),
    ];
    for (predicate, build) in pairs {
        for property in iris(graph, term, predicate)? {
            constraints.push(build(property));
        }
    }

    let references: [(NamedNodeRef<'_>, fn(ShapeId) -> Constraint); 3] = [
        (sh::NOT, Constraint::Not),
        (sh::NODE, Constraint::Node),
        (sh::PROPERTY, Constraint::Property),
    ];
    for (predicate, build) in references {
        for reference in objects(graph, term, predicate) {
            constraints.push(build(ShapeId::try_from(reference)?));
        }
    }
    let logical: [(NamedNodeRef<'_>, fn(Vec<ShapeId>) -> Constraint); 3] = [
        (sh::AND, Constraint::And),
        (sh::OR, Constraint::Or),
        (sh::XONE, Constraint::Xone),
    ];
    for (predicate, build) in logical {
        for list in objects(graph, term, predicate) {
            let members = rdf_list(graph, list, term)?
                .into_iter()
                .map(ShapeId::try_from)
                .collect::<Result<_, _>>()?;
            constraints.push(build(members));
        }
    }

    if let Some(qualified) = object(graph, term, sh::QUALIFIED_VALUE_SHAPE) {
        let siblings = if boolean(graph, term, sh::QUALIFIED_VALUE_SHAPES_DISJOINT)? == Some(true)
        {
            sibling_qualified_shapes(graph, term)?
        } else {
            Vec::new()
        };
        constraints.push(Constraint::QualifiedValueShape {
            shape: ShapeId::try_from(qualified)?,
            min_count: count(graph, term, sh::QUALIFIED_MIN_COUNT)?,
            max_count: count(graph, term, sh::QUALIFIED_MAX_COUNT)?,
            siblings,
        });
    }

    if boolean(graph, term, sh::CLOSED)? == Some(true) {
        let ignored_properties = match object(graph, term, sh::IGNORED_PROPERTIES) {
            Some(list) => rdf_list(graph, list, term)?
                .into_iter()
                .filter_map(|p| match p {
                    Term::NamedNode(p) => Some(p),
                    _ => None,
                })
                .collect(),
            None => Vec::new(),
        };
        constraints.push(Constraint::Closed { ignored_properties });
    }

    for value in objects(graph, term, sh::HAS_VALUE) {
        constraints.push(Constraint::HasValue(value));
    }
    if let Some(list) = object(graph, term, sh::IN) {
        constraints.push(Constraint::In(rdf_list(graph, list, term)?));
    }
    Ok(())
}

/// Qualified value shapes of the other property shapes of the node shapes declaring `term`.
fn sibling_qualified_shapes(graph: &Graph, term: &Term) -> Result<Vec<ShapeId>, ShaclParseError> {
    let mut siblings = Vec::new();
    for parent in subjects(graph, sh::PROPERTY, term.as_ref()) {
        for sibling in objects(graph, &parent, sh::PROPERTY) {
            if sibling == *term {
                continue;
            }
            for qualified in objects(graph, &sibling, sh::QUALIFIED_VALUE_SHAPE) {
                let id = ShapeId::try_from(qualified)?;
                if !siblings.contains(&id) {
                    siblings.push(id);
                }
            }
        }
    }
    Ok(siblings)
}

fn iris(
    graph: &Graph,
    term: &Term,
    predicate: NamedNodeRef<'_>,
) -> Result<Vec<NamedNode>, ShaclParseError> {
    objects(graph, term, predicate)
        .into_iter()
        .map(|value| match value {
            Term::NamedNode(iri) => Ok(iri),
            value => Err(ShaclParseError::invalid_property_value(
                term.clone(),
                predicate,
                "an IRI",
                value,
            )),
        })
        .collect()
}

fn count(
    graph: &Graph,
    term: &Term,
    predicate: NamedNodeRef<'_>,
) -> Result<Option<usize>, ShaclParseError> {
    let Some(value) = object(graph, term, predicate) else {
        return Ok(None);
    };
    if let Term::Literal(literal) = &value {
        if let Ok(count) = literal.value().parse() {
            return Ok(Some(count));
        }
    }
    Err(ShaclParseError::invalid_property_value(
        term.clone(),
        predicate,
        "a non-negative integer",
        value,
    ))
}

fn boolean(
    graph: &Graph,
    term: &Term,
    predicate: NamedNodeRef<'_>,
) -> Result<Option<bool>, ShaclParseError> {
    let Some(value) = object(graph, term, predicate) else {
        return Ok(None);
    };
    let parsed = match &value {
        Term::Literal(literal) => match literal.value() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| {
        ShaclParseError::invalid_property_value(term.clone(), predicate, "a boolean", value)
    })
}

fn string(graph: &Graph, term: &Term, predicate: NamedNodeRef<'_>) -> Option<String> {
    match object(graph, term, predicate)? {
        Term::Literal(literal) => Some(literal.value().to_owned()),
        _ => None,
    }
}
