//! Owned lookups over [`Graph`]s keyed by arbitrary terms.

use crate::error::ShaclParseError;
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{Graph, NamedNode, NamedNodeRef, Term, TermRef};
use rustc_hash::FxHashSet;

pub fn objects(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Vec<Term> {
    match subject {
        Term::NamedNode(n) => graph
            .objects_for_subject_predicate(n.as_ref(), predicate)
            .map(TermRef::into_owned)
            .collect(),
        Term::BlankNode(b) => graph
            .objects_for_subject_predicate(b.as_ref(), predicate)
            .map(TermRef::into_owned)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn object(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<Term> {
    match subject {
        Term::NamedNode(n) => graph
            .object_for_subject_predicate(n.as_ref(), predicate)
            .map(TermRef::into_owned),
        Term::BlankNode(b) => graph
            .object_for_subject_predicate(b.as_ref(), predicate)
            .map(TermRef::into_owned),
        _ => None,
    }
}

pub fn subjects(graph: &Graph, predicate: NamedNodeRef<'_>, object: TermRef<'_>) -> Vec<Term> {
    graph
        .subjects_for_predicate_object(predicate, object)
        .map(|s| s.into_owned().into())
        .collect()
}

/// Outgoing `(predicate, object)` pairs of `subject`.
pub fn outgoing(graph: &Graph, subject: &Term) -> Vec<(NamedNode, Term)> {
    match subject {
        Term::NamedNode(n) => graph
            .triples_for_subject(n.as_ref())
            .map(|t| (t.predicate.into_owned(), t.object.into_owned()))
            .collect(),
        Term::BlankNode(b) => graph
            .triples_for_subject(b.as_ref())
            .map(|t| (t.predicate.into_owned(), t.object.into_owned()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Reads the RDF collection starting at `head`.
pub fn rdf_list(graph: &Graph, head: Term, shape: &Term) -> Result<Vec<Term>, ShaclParseError> {
    let mut items = Vec::new();
    let mut seen = FxHashSet::default();
    let mut current = head;
    loop {
        if current == Term::NamedNode(rdf::NIL.into_owned()) {
            return Ok(items);
        }
        if !seen.insert(current.clone()) {
            return Err(ShaclParseError::invalid_rdf_list(
                shape.clone(),
                format!("{current} is part of a cycle"),
            ));
        }
        let first = object(graph, &current, rdf::FIRST).ok_or_else(|| {
            ShaclParseError::invalid_rdf_list(shape.clone(), format!("{current} has no rdf:first"))
        })?;
        items.push(first);
        current = object(graph, &current, rdf::REST).ok_or_else(|| {
            ShaclParseError::invalid_rdf_list(shape.clone(), format!("{current} has no rdf:rest"))
        })?;
    }
}

/// `class` and all its transitive `rdfs:subClassOf` subclasses.
pub fn subclasses(graph: &Graph, class: NamedNodeRef<'_>) -> Vec<Term> {
    let mut classes = vec![Term::from(class.into_owned())];
    let mut to_check = classes.clone();
    while let Some(current) = to_check.pop() {
        for subclass in subjects(graph, rdfs::SUB_CLASS_OF, current.as_ref()) {
            if !classes.contains(&subclass) {
                classes.push(subclass.clone());
                to_check.push(subclass);
            }
        }
    }
    classes
}

/// SHACL instance check: an `rdf:type` of `term` is `class` or one of its subclasses.
pub fn is_instance_of(graph: &Graph, term: &Term, class: NamedNodeRef<'_>) -> bool {
    let types = objects(graph, term, rdf::TYPE);
    if types.is_empty() {
        return false;
    }
    let classes = subclasses(graph, class);
    types.iter().any(|t| classes.contains(t))
}
