//! [SHACL property paths](https://www.w3.org/TR/shacl/#property-paths).

use crate::error::ShaclParseError;
use crate::graph::{object, objects, rdf_list, subjects};
use crate::vocab::sh;
use oxrdf::vocab::rdf;
use oxrdf::{Graph, NamedNode, Term};
use rustc_hash::FxHashSet;
use std::fmt;

const MAX_PATH_DEPTH: usize = 32;

/// A SHACL property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    Predicate(NamedNode),
    Sequence(Vec<PropertyPath>),
    Alternative(Vec<PropertyPath>),
    Inverse(Box<PropertyPath>),
    ZeroOrMore(Box<PropertyPath>),
    OneOrMore(Box<PropertyPath>),
    ZeroOrOne(Box<PropertyPath>),
}

impl PropertyPath {
    /// Parses the path described by `term` in a shapes graph.
    pub fn parse(graph: &Graph, term: &Term) -> Result<Self, ShaclParseError> {
        Self::parse_at_depth(graph, term, 0)
    }

    fn parse_at_depth(graph: &Graph, term: &Term, depth: usize) -> Result<Self, ShaclParseError> {
        if depth > MAX_PATH_DEPTH {
            return Err(ShaclParseError::invalid_property_path(
                term.clone(),
                "the path is nested too deeply",
            ));
        }
        match term {
            Term::NamedNode(node) => Ok(Self::Predicate(node.clone())),
            Term::BlankNode(_) => {
                let unary = |inner: Term| Self::parse_at_depth(graph, &inner, depth + 1).map(Box::new);
                if let Some(list) = object(graph, term, sh::ALTERNATIVE_PATH) {
                    let members = rdf_list(graph, list, term)?
                        .iter()
                        .map(|member| Self::parse_at_depth(graph, member, depth + 1))
                        .collect::<Result<Vec<_>, _>>()?;
                    if members.is_empty() {
                        return Err(ShaclParseError::invalid_property_path(
                            term.clone(),
                            "sh:alternativePath requires at least one member",
                        ));
                    }
                    Ok(Self::Alternative(members))
                } else if let Some(inner) = object(graph, term, sh::INVERSE_PATH) {
                    Ok(Self::Inverse(unary(inner)?))
                } else if let Some(inner) = object(graph, term, sh::ZERO_OR_MORE_PATH) {
                    Ok(Self::ZeroOrMore(unary(inner)?))
                } else if let Some(inner) = object(graph, term, sh::ONE_OR_MORE_PATH) {
                    Ok(Self::OneOrMore(unary(inner)?))
                } else if let Some(inner) = object(graph, term, sh::ZERO_OR_ONE_PATH) {
                    Ok(Self::ZeroOrOne(unary(inner)?))
                } else if object(graph, term, rdf::FIRST).is_some() {
                    let members = rdf_list(graph, term.clone(), term)?
                        .iter()
                        .map(|member| Self::parse_at_depth(graph, member, depth + 1))
                        .collect::<Result<Vec<_>, _>>()?;
                    if members.len() < 2 {
                        return Err(ShaclParseError::invalid_property_path(
                            term.clone(),
                            "a sequence path requires at least two members",
                        ));
                    }
                    Ok(Self::Sequence(members))
                } else {
                    Err(ShaclParseError::invalid_property_path(
                        term.clone(),
                        "unknown property path structure",
                    ))
                }
            }
            _ => Err(ShaclParseError::invalid_property_path(
                term.clone(),
                "a property path must be an IRI or a blank node",
            )),
        }
    }

    /// The value nodes reachable from `focus_node` through this path, without duplicates.
    pub fn evaluate(&self, graph: &Graph, focus_node: &Term) -> Vec<Term> {
        self.step(graph, focus_node, false)
    }

    /// Returns the predicate if this is a simple predicate path.
    pub fn as_predicate(&self) -> Option<&NamedNode> {
        match self {
            Self::Predicate(p) => Some(p),
            _ => None,
        }
    }

    fn step(&self, graph: &Graph, node: &Term, inverse: bool) -> Vec<Term> {
        match self {
            Self::Predicate(predicate) => {
                if inverse {
                    subjects(graph, predicate.as_ref(), node.as_ref())
                } else {
                    objects(graph, node, predicate.as_ref())
                }
            }
            Self::Sequence(members) => {
                let mut current = vec![node.clone()];
                let mut apply = |member: &Self| {
                    let mut next = Nodes::default();
                    for node in &current {
                        next.extend(member.step(graph, node, inverse));
                    }
                    current = next.into_vec();
                };
                if inverse {
                    members.iter().rev().for_each(&mut apply);
                } else {
                    members.iter().for_each(&mut apply);
                }
                current
            }
            Self::Alternative(members) => {
                let mut values = Nodes::default();
                for member in members {
                    values.extend(member.step(graph, node, inverse));
                }
                values.into_vec()
            }
            Self::Inverse(inner) => inner.step(graph, node, !inverse),
            Self::ZeroOrMore(inner) => inner.closure(graph, node, inverse, true),
            Self::OneOrMore(inner) => inner.closure(graph, node, inverse, false),
            Self::ZeroOrOne(inner) => {
                let mut values = Nodes::default();
                values.push(node.clone());
                values.extend(inner.step(graph, node, inverse));
                values.into_vec()
            }
        }
    }

    /// Nodes reachable from `start` by repeating this path.
    fn closure(&self, graph: &Graph, start: &Term, inverse: bool, reflexive: bool) -> Vec<Term> {
        let mut values = Nodes::default();
        if reflexive {
            values.push(start.clone());
        }
        let mut expanded = FxHashSet::default();
        let mut queue = vec![start.clone()];
        while let Some(current) = queue.pop() {
            if !expanded.insert(current.clone()) {
                continue;
            }
            for next in self.step(graph, &current, inverse) {
                values.push(next.clone());
                queue.push(next);
            }
        }
        values.into_vec()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, paths: &[PropertyPath], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, p) in paths.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{p}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::Predicate(p) => write!(f, "{p}"),
            Self::Sequence(paths) => join(f, paths, " / "),
            Self::Alternative(paths) => join(f, paths, " | "),
            Self::Inverse(p) => write!(f, "^{p}"),
            Self::ZeroOrMore(p) => write!(f, "{p}*"),
            Self::OneOrMore(p) => write!(f, "{p}+"),
            Self::ZeroOrOne(p) => write!(f, "{p}?"),
        }
    }
}

/// Insertion ordered set of nodes.
#[derive(Default)]
struct Nodes {
    seen: FxHashSet<Term>,
    order: Vec<Term>,
}

impl Nodes {
    fn push(&mut self, node: Term) {
        if self.seen.insert(node.clone()) {
            self.order.push(node);
        }
    }

    fn extend(&mut self, nodes: impl IntoIterator<Item = Term>) {
        for node in nodes {
            self.push(node);
        }
    }

    fn into_vec(self) -> Vec<Term> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Triple};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn chain() -> Graph {
        // a -p-> b -p-> c -q-> d, c -p-> a
        let mut graph = Graph::new();
        graph.insert(&Triple::new(ex("a"), ex("p"), ex("b")));
        graph.insert(&Triple::new(ex("b"), ex("p"), ex("c")));
        graph.insert(&Triple::new(ex("c"), ex("q"), ex("d")));
        graph.insert(&Triple::new(ex("c"), ex("p"), ex("a")));
        graph
    }

    fn terms(names: &[&str]) -> Vec<Term> {
        names.iter().map(|n| ex(n).into()).collect()
    }

    fn sorted(mut values: Vec<Term>) -> Vec<Term> {
        values.sort_by_key(ToString::to_string);
        values
    }

    #[test]
    fn predicate_and_inverse() {
        let graph = chain();
        let p = PropertyPath::Predicate(ex("p"));
        assert_eq!(p.evaluate(&graph, &ex("a").into()), terms(&["b"]));
        let inverse = PropertyPath::Inverse(Box::new(p));
        assert_eq!(inverse.evaluate(&graph, &ex("a").into()), terms(&["c"]));
    }

    #[test]
    fn sequence_and_inverse_sequence() {
        let graph = chain();
        let seq = PropertyPath::Sequence(vec![
            PropertyPath::Predicate(ex("p")),
            PropertyPath::Predicate(ex("p")),
            PropertyPath::Predicate(ex("q")),
        ]);
        assert_eq!(seq.evaluate(&graph, &ex("a").into()), terms(&["d"]));
        let inverse = PropertyPath::Inverse(Box::new(seq));
        assert_eq!(inverse.evaluate(&graph, &ex("d").into()), terms(&["a"]));
    }

    #[test]
    fn closures_terminate_on_cycles() {
        let graph = chain();
        let p = Box::new(PropertyPath::Predicate(ex("p")));
        assert_eq!(
            sorted(PropertyPath::ZeroOrMore(p.clone()).evaluate(&graph, &ex("a").into())),
            terms(&["a", "b", "c"])
        );
        assert_eq!(
            sorted(PropertyPath::OneOrMore(p.clone()).evaluate(&graph, &ex("b").into())),
            terms(&["a", "b", "c"])
        );
        assert_eq!(
            sorted(PropertyPath::ZeroOrOne(p).evaluate(&graph, &ex("a").into())),
            terms(&["a", "b"])
        );
        let q = Box::new(PropertyPath::Predicate(ex("q")));
        assert_eq!(
            PropertyPath::OneOrMore(q).evaluate(&graph, &ex("a").into()),
            Vec::<Term>::new()
        );
    }

    #[test]
    fn alternative_removes_duplicates() {
        let graph = chain();
        let alt = PropertyPath::Alternative(vec![
            PropertyPath::Predicate(ex("p")),
            PropertyPath::Predicate(ex("p")),
            PropertyPath::Predicate(ex("q")),
        ]);
        assert_eq!(
            sorted(alt.evaluate(&graph, &ex("c").into())),
            terms(&["a", "d"])
        );
    }

    #[test]
    fn parse_complex_path() -> Result<(), ShaclParseError> {
        let mut graph = Graph::new();
        let (inverse, list, rest, star) = (
            BlankNode::default(),
            BlankNode::default(),
            BlankNode::default(),
            BlankNode::default(),
        );
        graph.insert(&Triple::new(list.clone(), rdf::FIRST, inverse.clone()));
        graph.insert(&Triple::new(list.clone(), rdf::REST, rest.clone()));
        graph.insert(&Triple::new(rest.clone(), rdf::FIRST, star.clone()));
        graph.insert(&Triple::new(rest, rdf::REST, rdf::NIL));
        graph.insert(&Triple::new(inverse, sh::INVERSE_PATH, ex("p")));
        graph.insert(&Triple::new(star, sh::ZERO_OR_MORE_PATH, ex("q")));
        let path = PropertyPath::parse(&graph, &list.into())?;
        assert_eq!(
            path,
            PropertyPath::Sequence(vec![
                PropertyPath::Inverse(Box::new(PropertyPath::Predicate(ex("p")))),
                PropertyPath::ZeroOrMore(Box::new(PropertyPath::Predicate(ex("q")))),
            ])
        );
        assert_eq!(
            path.to_string(),
            "(^<http://example.com/p> / <http://example.com/q>*)"
        );
        Ok(())
    }

    #[test]
    fn parse_rejects_literals_and_unknown_structures() {
        let mut graph = Graph::new();
        let node = BlankNode::default();
        graph.insert(&Triple::new(node.clone(), ex("p"), ex("q")));
        assert!(PropertyPath::parse(&graph, &node.into()).is_err());
        assert!(PropertyPath::parse(&graph, &oxrdf::Literal::from(1).into()).is_err());
    }
}
