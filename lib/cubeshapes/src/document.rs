use crate::error::ImportError;
use oxrdf::{BlankNode, NamedOrBlankNode, Term, Triple};
use oxttl::TurtleParser;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Reads and parses a Turtle document, keeping the triples in document order.
///
/// Relative IRIs are resolved against the `file:` URL of the document.
/// Blank nodes get fresh identifiers, so two documents never share one.
pub fn parse_document(path: impl AsRef<Path>) -> Result<Vec<Triple>, ImportError> {
    parse_canonical(&canonicalize(path.as_ref())?)
}

/// Returns the `file:` URL of `path`, suitable as a base IRI for its content.
pub fn file_base_iri(path: impl AsRef<Path>) -> Result<String, ImportError> {
    let path = canonicalize(path.as_ref())?;
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|()| ImportError::InvalidPath { path })
}

pub(crate) fn canonicalize(path: &Path) -> Result<PathBuf, ImportError> {
    fs::canonicalize(path).map_err(|e| ImportError::io(path, e))
}

/// Parses a document whose path is already canonical.
pub(crate) fn parse_canonical(path: &Path) -> Result<Vec<Triple>, ImportError> {
    let content = fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
    let base_iri = Url::from_file_path(path)
        .map_err(|()| ImportError::InvalidPath {
            path: path.to_owned(),
        })?
        .to_string();
    let mut triples = TurtleParser::new()
        .with_base_iri(base_iri)
        .map_err(|_| ImportError::InvalidPath {
            path: path.to_owned(),
        })?
        .for_slice(content.as_bytes())
        .map(|triple| {
            triple.map_err(|source| ImportError::Parse {
                path: path.to_owned(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    rename_blank_nodes(&mut triples);
    Ok(triples)
}

/// Replaces the labels written in the document by fresh blank nodes.
fn rename_blank_nodes(triples: &mut [Triple]) {
    let mut fresh = HashMap::<BlankNode, BlankNode>::new();
    let mut rename = |node: &mut BlankNode| {
        *node = fresh.entry(node.clone()).or_default().clone();
    };
    for triple in triples {
        if let NamedOrBlankNode::BlankNode(node) = &mut triple.subject {
            rename(node);
        }
        if let Term::BlankNode(node) = &mut triple.object {
            rename(node);
        }
    }
}
