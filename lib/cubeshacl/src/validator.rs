use crate::constraint::{Constraint, ConstraintComponent};
use crate::error::{ShaclError, ShaclParseError, ShaclValidationError};
use crate::graph::{is_instance_of, objects, outgoing};
use crate::model::{Shape, ShapeId, ShapesGraph};
use crate::path::PropertyPath;
use crate::report::{ValidationReport, ValidationResult};
use crate::value::{compare, compile_pattern, is_well_formed, lang_matches, lexical_form};
use oxrdf::{Graph, NamedNode, Term};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use tracing::{debug, trace};

/// Maximal nesting of shape references followed during validation.
const MAX_RECURSION_DEPTH: usize = 50;

/// Validates data graphs against a [`ShapesGraph`].
///
/// ```
/// use cubeshacl::{ShaclValidator, ShapesGraph};
/// use oxrdf::Graph;
///
/// let validator = ShaclValidator::new(ShapesGraph::new());
/// assert!(validator.validate(&Graph::new())?.conforms());
/// # Result::<_, cubeshacl::ShaclError>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct ShaclValidator {
    shapes: ShapesGraph,
}

impl ShaclValidator {
    pub fn new(shapes: ShapesGraph) -> Self {
        Self { shapes }
    }

    pub fn shapes(&self) -> &ShapesGraph {
        &self.shapes
    }

    /// Validates every focus node of every active shape.
    pub fn validate(&self, data: &Graph) -> Result<ValidationReport, ShaclError> {
        let mut context = ValidationContext::new(data);
        let mut report = ValidationReport::new();
        for shape in self.shapes.iter() {
            if shape.deactivated || shape.targets.is_empty() {
                continue;
            }
            let focus_nodes = focus_nodes(shape, data);
            trace!("{} focus nodes for {}", focus_nodes.len(), shape.id);
            for focus_node in &focus_nodes {
                self.validate_shape(&mut context, &mut report, shape, focus_node, 0)?;
            }
        }
        debug!(
            "Validation of {} triples done with {} results",
            data.len(),
            report.results().len()
        );
        Ok(report)
    }

    fn validate_shape(
        &self,
        context: &mut ValidationContext<'_>,
        report: &mut ValidationReport,
        shape: &Shape,
        focus_node: &Term,
        depth: usize,
    ) -> Result<(), ShaclError> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(ShaclValidationError::MaxRecursionDepth { depth }.into());
        }
        if shape.deactivated {
            return Ok(());
        }
        let value_nodes = match &shape.path {
            Some(path) => path.evaluate(context.data, focus_node),
            None => vec![focus_node.clone()],
        };
        let check = Check {
            shape,
            focus_node,
            value_nodes: &value_nodes,
            depth,
        };
        for constraint in &shape.constraints {
            self.validate_constraint(context, report, &check, constraint)?;
        }
        Ok(())
    }

    /// Whether `node` conforms to the shape `id`, i.e. validating it yields no result.
    fn conforms(
        &self,
        context: &mut ValidationContext<'_>,
        id: &ShapeId,
        node: &Term,
        depth: usize,
    ) -> Result<bool, ShaclError> {
        let Some(shape) = self.shapes.get(id) else {
            return Ok(true);
        };
        let mut report = ValidationReport::new();
        self.validate_shape(context, &mut report, shape, node, depth + 1)?;
        Ok(report.conforms())
    }

    fn validate_constraint(
        &self,
        context: &mut ValidationContext<'_>,
        report: &mut ValidationReport,
        check: &Check<'_>,
        constraint: &Constraint,
    ) -> Result<(), ShaclError> {
        let values = check.value_nodes;
        match constraint {
            Constraint::Class(class) => {
                for value in values {
                    if !is_instance_of(context.data, value, class.as_ref()) {
                        report.add_result(check.value_result(
                            ConstraintComponent::Class,
                            value,
                            format!("Value is not an instance of {class}"),
                        ));
                    }
                }
            }
            Constraint::Datatype(datatype) => {
                for value in values {
                    let valid = match value {
                        Term::Literal(literal) => {
                            literal.datatype() == datatype.as_ref() && is_well_formed(literal)
                        }
                        _ => false,
                    };
                    if !valid {
                        report.add_result(check.value_result(
                            ConstraintComponent::Datatype,
                            value,
                            format!("Value is not a valid literal of datatype {datatype}"),
                        ));
                    }
                }
            }
            Constraint::NodeKind(kind) => {
                for value in values {
                    if !kind.matches(value) {
                        report.add_result(check.value_result(
                            ConstraintComponent::NodeKind,
                            value,
                            "Value does not have the expected node kind",
                        ));
                    }
                }
            }
            Constraint::MinCount(min) => {
                if values.len() < *min {
                    report.add_result(check.result(
                        ConstraintComponent::MinCount,
                        format!("Expected at least {min} value(s), got {}", values.len()),
                    ));
                }
            }
            Constraint::MaxCount(max) => {
                if values.len() > *max {
                    report.add_result(check.result(
                        ConstraintComponent::MaxCount,
                        format!("Expected at most {max} value(s), got {}", values.len()),
                    ));
                }
            }
            Constraint::MinExclusive(bound) => {
                check.range(report, ConstraintComponent::MinExclusive, bound.clone().into(), |o| {
                    o == Ordering::Greater
                });
            }
            Constraint::MinInclusive(bound) => {
                check.range(report, ConstraintComponent::MinInclusive, bound.clone().into(), |o| {
                    o != Ordering::Less
                });
            }
            Constraint::MaxExclusive(bound) => {
                check.range(report, ConstraintComponent::MaxExclusive, bound.clone().into(), |o| {
                    o == Ordering::Less
                });
            }
            Constraint::MaxInclusive(bound) => {
                check.range(report, ConstraintComponent::MaxInclusive, bound.clone().into(), |o| {
                    o != Ordering::Greater
                });
            }
            Constraint::MinLength(min) => {
                for value in values {
                    if lexical_form(value).is_none_or(|s| s.chars().count() < *min) {
                        report.add_result(check.value_result(
                            ConstraintComponent::MinLength,
                            value,
                            format!("Value is shorter than {min} characters"),
                        ));
                    }
                }
            }
            Constraint::MaxLength(max) => {
                for value in values {
                    if lexical_form(value).is_none_or(|s| s.chars().count() > *max) {
                        report.add_result(check.value_result(
                            ConstraintComponent::MaxLength,
                            value,
                            format!("Value is longer than {max} characters"),
                        ));
                    }
                }
            }
            Constraint::Pattern { pattern, flags } => {
                let regex = context.regex(pattern, flags.as_deref())?;
                for value in values {
                    if !lexical_form(value).is_some_and(|s| regex.is_match(s)) {
                        report.add_result(check.value_result(
                            ConstraintComponent::Pattern,
                            value,
                            format!("Value does not match the pattern \"{pattern}\""),
                        ));
                    }
                }
            }
            Constraint::LanguageIn(languages) => {
                for value in values {
                    let matches = match value {
                        Term::Literal(literal) => literal.language().is_some_and(|tag| {
                            languages.iter().any(|range| lang_matches(tag, range))
                        }),
                        _ => false,
                    };
                    if !matches {
                        report.add_result(check.value_result(
                            ConstraintComponent::LanguageIn,
                            value,
                            format!("Language tag not in {}", languages.join(", ")),
                        ));
                    }
                }
            }
            Constraint::UniqueLang => {
                let mut counts = FxHashMap::<String, usize>::default();
                for value in values {
                    if let Term::Literal(literal) = value {
                        if let Some(language) = literal.language() {
                            *counts.entry(language.to_ascii_lowercase()).or_default() += 1;
                        }
                    }
                }
                let mut duplicates = counts
                    .into_iter()
                    .filter(|(_, count)| *count > 1)
                    .map(|(language, _)| language)
                    .collect::<Vec<_>>();
                duplicates.sort();
                for language in duplicates {
                    report.add_result(check.result(
                        ConstraintComponent::UniqueLang,
                        format!("Language \"{language}\" is used by more than one value"),
                    ));
                }
            }
            Constraint::Equals(property) => {
                let others = objects(context.data, check.focus_node, property.as_ref());
                for value in values.iter().filter(|v| !others.contains(v)) {
                    report.add_result(check.value_result(
                        ConstraintComponent::Equals,
                        value,
                        format!("Value is not a value of {property}"),
                    ));
                }
                for other in others.iter().filter(|o| !values.contains(o)) {
                    report.add_result(check.value_result(
                        ConstraintComponent::Equals,
                        other,
                        format!("Value of {property} is missing"),
                    ));
                }
            }
            Constraint::Disjoint(property) => {
                let others = objects(context.data, check.focus_node, property.as_ref());
                for value in values.iter().filter(|v| others.contains(v)) {
                    report.add_result(check.value_result(
                        ConstraintComponent::Disjoint,
                        value,
                        format!("Value is also a value of {property}"),
                    ));
                }
            }
            Constraint::LessThan(property) => {
                check.property_pair(
                    context.data,
                    report,
                    ConstraintComponent::LessThan,
                    property,
                    |o| o == Ordering::Less,
                );
            }
            Constraint::LessThanOrEquals(property) => {
                check.property_pair(
                    context.data,
                    report,
                    ConstraintComponent::LessThanOrEquals,
                    property,
                    |o| o != Ordering::Greater,
                );
            }
            Constraint::Not(id) => {
                for value in values {
                    if self.conforms(context, id, value, check.depth)? {
                        report.add_result(check.value_result(
                            ConstraintComponent::Not,
                            value,
                            format!("Value conforms to {id}"),
                        ));
                    }
                }
            }
            Constraint::And(ids) => {
                for value in values {
                    let mut conforms = true;
                    for id in ids {
                        if !self.conforms(context, id, value, check.depth)? {
                            conforms = false;
                            break;
                        }
                    }
                    if !conforms {
                        report.add_result(check.value_result(
                            ConstraintComponent::And,
                            value,
                            "Value does not conform to all the sh:and shapes",
                        ));
                    }
                }
            }
            Constraint::Or(ids) => {
                for value in values {
                    let mut conforms = false;
                    for id in ids {
                        if self.conforms(context, id, value, check.depth)? {
                            conforms = true;
                            break;
                        }
                    }
                    if !conforms {
                        report.add_result(check.value_result(
                            ConstraintComponent::Or,
                            value,
                            "Value does not conform to any of the sh:or shapes",
                        ));
                    }
                }
            }
            Constraint::Xone(ids) => {
                for value in values {
                    let mut count = 0;
                    for id in ids {
                        if self.conforms(context, id, value, check.depth)? {
                            count += 1;
                        }
                    }
                    if count != 1 {
                        report.add_result(check.value_result(
                            ConstraintComponent::Xone,
                            value,
                            format!("Value conforms to {count} of the sh:xone shapes"),
                        ));
                    }
                }
            }
            Constraint::Node(id) => {
                for value in values {
                    if !self.conforms(context, id, value, check.depth)? {
                        report.add_result(check.value_result(
                            ConstraintComponent::Node,
                            value,
                            format!("Value does not conform to {id}"),
                        ));
                    }
                }
            }
            Constraint::Property(id) => {
                if let Some(property) = self.shapes.get(id) {
                    for value in values {
                        self.validate_shape(context, report, property, value, check.depth + 1)?;
                    }
                }
            }
            Constraint::QualifiedValueShape {
                shape,
                min_count,
                max_count,
                siblings,
            } => {
                let mut count = 0;
                for value in values {
                    if !self.conforms(context, shape, value, check.depth)? {
                        continue;
                    }
                    let mut in_sibling = false;
                    for sibling in siblings {
                        if self.conforms(context, sibling, value, check.depth)? {
                            in_sibling = true;
                            break;
                        }
                    }
                    if !in_sibling {
                        count += 1;
                    }
                }
                if let Some(min) = min_count {
                    if count < *min {
                        report.add_result(check.result(
                            ConstraintComponent::QualifiedMinCount,
                            format!("Expected at least {min} value(s) conforming to {shape}, got {count}"),
                        ));
                    }
                }
                if let Some(max) = max_count {
                    if count > *max {
                        report.add_result(check.result(
                            ConstraintComponent::QualifiedMaxCount,
                            format!("Expected at most {max} value(s) conforming to {shape}, got {count}"),
                        ));
                    }
                }
            }
            Constraint::Closed { ignored_properties } => {
                let allowed = self.declared_properties(check.shape, ignored_properties);
                for value in values {
                    for (predicate, object) in outgoing(context.data, value) {
                        if !allowed.contains(&predicate) {
                            report.add_result(
                                ValidationResult::new(
                                    value.clone(),
                                    check.shape.id.clone(),
                                    ConstraintComponent::Closed,
                                )
                                .with_path(Some(PropertyPath::Predicate(predicate.clone())))
                                .with_value(object)
                                .with_severity(check.shape.severity)
                                .with_message(check.message(format!(
                                    "Property {predicate} is not allowed by the closed shape"
                                ))),
                            );
                        }
                    }
                }
            }
            Constraint::HasValue(expected) => {
                if !values.contains(expected) {
                    report.add_result(check.result(
                        ConstraintComponent::HasValue,
                        format!("Missing expected value {expected}"),
                    ));
                }
            }
            Constraint::In(allowed) => {
                for value in values.iter().filter(|v| !allowed.contains(v)) {
                    report.add_result(check.value_result(
                        ConstraintComponent::In,
                        value,
                        "Value is not in the list of allowed values",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Predicates of the `sh:property` shapes of `shape` that are simple predicate paths.
    fn declared_properties(
        &self,
        shape: &Shape,
        ignored_properties: &[NamedNode],
    ) -> FxHashSet<NamedNode> {
        shape
            .constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::Property(id) => self.shapes.get(id),
                _ => None,
            })
            .filter_map(|property| property.path.as_ref()?.as_predicate().cloned())
            .chain(ignored_properties.iter().cloned())
            .collect()
    }
}

/// A shape applied to a focus node.
struct Check<'a> {
    shape: &'a Shape,
    focus_node: &'a Term,
    value_nodes: &'a [Term],
    depth: usize,
}

impl Check<'_> {
    fn message(&self, default: String) -> String {
        self.shape.message.clone().unwrap_or(default)
    }

    fn result(&self, component: ConstraintComponent, message: impl Into<String>) -> ValidationResult {
        ValidationResult::new(self.focus_node.clone(), self.shape.id.clone(), component)
            .with_path(self.shape.path.clone())
            .with_severity(self.shape.severity)
            .with_message(self.message(message.into()))
    }

    fn value_result(
        &self,
        component: ConstraintComponent,
        value: &Term,
        message: impl Into<String>,
    ) -> ValidationResult {
        self.result(component, message).with_value(value.clone())
    }

    fn range(
        &self,
        report: &mut ValidationReport,
        component: ConstraintComponent,
        bound: Term,
        accept: impl Fn(Ordering) -> bool,
    ) {
        for value in self.value_nodes {
            if !compare(value, &bound).is_some_and(&accept) {
                report.add_result(self.value_result(
                    component,
                    value,
                    format!("Value is not in range of {bound}"),
                ));
            }
        }
    }

    fn property_pair(
        &self,
        data: &Graph,
        report: &mut ValidationReport,
        component: ConstraintComponent,
        property: &NamedNode,
        accept: impl Fn(Ordering) -> bool,
    ) {
        let others = objects(data, self.focus_node, property.as_ref());
        for value in self.value_nodes {
            for other in &others {
                if !compare(value, other).is_some_and(&accept) {
                    report.add_result(self.value_result(
                        component,
                        value,
                        format!("Value is not comparable as expected with {other} of {property}"),
                    ));
                }
            }
        }
    }
}

struct ValidationContext<'a> {
    data: &'a Graph,
    regex_cache: FxHashMap<(String, Option<String>), Regex>,
}

impl<'a> ValidationContext<'a> {
    fn new(data: &'a Graph) -> Self {
        Self {
            data,
            regex_cache: FxHashMap::default(),
        }
    }

    fn regex(&mut self, pattern: &str, flags: Option<&str>) -> Result<&Regex, ShaclParseError> {
        Ok(
            match self
                .regex_cache
                .entry((pattern.to_owned(), flags.map(ToOwned::to_owned)))
            {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(compile_pattern(pattern, flags)?),
            },
        )
    }
}

/// The focus nodes of all the targets of `shape`, without duplicates.
fn focus_nodes(shape: &Shape, data: &Graph) -> Vec<Term> {
    let mut seen = FxHashSet::default();
    shape
        .targets
        .iter()
        .flat_map(|target| target.find_focus_nodes(data))
        .filter(|node| seen.insert(node.clone()))
        .collect()
}
