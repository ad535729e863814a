#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use cubeshapes::vocab::code;
use cubeshapes::{ImportError, ShapesLoader, load_shapes, parse_document, resolve};
use oxrdf::{Graph, NamedNodeRef, Triple};
use std::collections::HashSet;

const PREFIXES: &str = "@prefix code: <https://code.described.at/> .
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.com/> .
";

fn document(dir: &TempDir, name: &str, body: &str) -> Result<()> {
    dir.child(name).write_str(&format!("{PREFIXES}{body}"))?;
    Ok(())
}

fn shape_names(graph: &Graph) -> Vec<String> {
    let mut names = graph
        .triples_for_predicate(NamedNodeRef::new_unchecked(
            "http://www.w3.org/ns/shacl#name",
        ))
        .map(|t| t.object.to_string())
        .collect::<Vec<_>>();
    names.sort();
    names
}

fn directive_count(graph: &Graph) -> usize {
    graph.triples_for_predicate(code::IMPORTS).count()
        + graph.triples_for_predicate(code::EXTENSION).count()
}

#[test]
fn acyclic_imports_are_merged() -> Result<()> {
    let dir = TempDir::new()?;
    document(
        &dir,
        "root.ttl",
        "<> code:imports <./base>, <./extra.ttl> .\nex:Root sh:name \"root\" .",
    )?;
    document(
        &dir,
        "base.ttl",
        "<> code:imports <./common> .\nex:Base sh:name \"base\" .",
    )?;
    document(
        &dir,
        "extra.ttl",
        "<> code:imports <./common> .\nex:Extra sh:name \"extra\" .",
    )?;
    document(&dir, "common.ttl", "ex:Common sh:name \"common\" .")?;

    let graph = load_shapes(dir.child("root.ttl").path())?;
    assert_eq!(
        shape_names(&graph),
        ["\"base\"", "\"common\"", "\"extra\"", "\"root\""]
    );
    assert_eq!(graph.len(), 4);
    assert_eq!(directive_count(&graph), 0);
    Ok(())
}

#[test]
fn merged_graph_is_the_union_of_non_directive_triples() -> Result<()> {
    let dir = TempDir::new()?;
    document(
        &dir,
        "root.ttl",
        "<> code:imports <./base> .\nex:Shape sh:property [ sh:path ex:p ; sh:minCount 1 ] .",
    )?;
    document(
        &dir,
        "base.ttl",
        "ex:Shape a sh:NodeShape ; sh:targetClass ex:Thing .",
    )?;

    let mut expected = Graph::new();
    for name in ["root.ttl", "base.ttl"] {
        for triple in parse_document(dir.child(name).path())? {
            if triple.predicate.as_ref() != code::IMPORTS {
                expected.insert(&triple);
            }
        }
    }
    let graph = load_shapes(dir.child("root.ttl").path())?;
    // Blank node labels differ between parses
    assert_eq!(graph.len(), expected.len());
    assert!(graph.contains(
        expected
            .triples_for_predicate(NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#targetClass"
            ))
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing target"))?
    ));
    Ok(())
}

#[test]
fn cycles_terminate() -> Result<()> {
    let dir = TempDir::new()?;
    document(&dir, "a.ttl", "<> code:imports <./b> .\nex:A sh:name \"a\" .")?;
    document(&dir, "b.ttl", "<> code:imports <./a> .\nex:B sh:name \"b\" .")?;

    let graph = load_shapes(dir.child("a.ttl").path())?;
    assert_eq!(shape_names(&graph), ["\"a\"", "\"b\""]);
    assert_eq!(directive_count(&graph), 0);
    Ok(())
}

#[test]
fn self_import_terminates() -> Result<()> {
    let dir = TempDir::new()?;
    document(&dir, "self.ttl", "<> code:imports <./self> .\nex:S sh:name \"s\" .")?;
    let graph = load_shapes(dir.child("self.ttl").path())?;
    assert_eq!(shape_names(&graph), ["\"s\""]);
    Ok(())
}

#[test]
fn visited_documents_contribute_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    document(&dir, "root.ttl", "<> code:imports <./base> .\nex:R sh:name \"r\" .")?;
    document(&dir, "base.ttl", "ex:B sh:name \"b\" .")?;

    let mut visited = HashSet::new();
    visited.insert(dir.child("base.ttl").path().canonicalize()?);
    let graph = resolve(dir.child("root.ttl").path(), &mut visited)?;
    assert_eq!(shape_names(&graph), ["\"r\""]);
    assert_eq!(visited.len(), 2);

    let again = resolve(dir.child("root.ttl").path(), &mut visited)?;
    assert!(again.is_empty());
    Ok(())
}

#[test]
fn extension_directives_are_stripped() -> Result<()> {
    let dir = TempDir::new()?;
    document(
        &dir,
        "root.ttl",
        "<> code:extension <./plugin.js> ; code:imports <./base> .\nex:R sh:name \"r\" .",
    )?;
    document(
        &dir,
        "base.ttl",
        "ex:B code:extension \"whatever\" ; sh:name \"b\" .",
    )?;
    let graph = load_shapes(dir.child("root.ttl").path())?;
    assert_eq!(directive_count(&graph), 0);
    assert_eq!(graph.len(), 2);
    Ok(())
}

#[test]
fn missing_imports_are_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    document(
        &dir,
        "root.ttl",
        "<> code:imports <./missing>, <./base> .\nex:R sh:name \"r\" .",
    )?;
    document(&dir, "base.ttl", "ex:B sh:name \"b\" .")?;
    let graph = load_shapes(dir.child("root.ttl").path())?;
    assert_eq!(shape_names(&graph), ["\"b\"", "\"r\""]);
    Ok(())
}

#[test]
fn strict_loader_rejects_missing_imports() -> Result<()> {
    let dir = TempDir::new()?;
    document(&dir, "root.ttl", "<> code:imports <./missing> .")?;
    let err = ShapesLoader::new()
        .strict()
        .load(dir.child("root.ttl").path())
        .unwrap_err();
    let ImportError::MissingImport { importer, target } = &err else {
        panic!("unexpected error {err}");
    };
    assert!(importer.ends_with("root.ttl"));
    assert!(target.ends_with("missing.ttl"));
    Ok(())
}

#[test]
fn literal_directives_are_resolved_like_iris() -> Result<()> {
    let dir = TempDir::new()?;
    dir.child("shapes").create_dir_all()?;
    document(
        &dir,
        "shapes/root.ttl",
        "<> code:imports \"./base\", \"nested/leaf.ttl\" .",
    )?;
    document(&dir, "shapes/base.ttl", "ex:B sh:name \"b\" .")?;
    dir.child("shapes/nested").create_dir_all()?;
    document(&dir, "shapes/nested/leaf.ttl", "ex:L sh:name \"l\" .")?;
    let graph = load_shapes(dir.child("shapes/root.ttl").path())?;
    assert_eq!(shape_names(&graph), ["\"b\"", "\"l\""]);
    Ok(())
}

#[test]
fn imports_are_relative_to_the_importing_document() -> Result<()> {
    let dir = TempDir::new()?;
    dir.child("lib/inner").create_dir_all()?;
    dir.child("inner").create_dir_all()?;
    document(&dir, "root.ttl", "<> code:imports <./lib/outer> .")?;
    document(&dir, "lib/outer.ttl", "<> code:imports <./inner/leaf> .")?;
    document(&dir, "lib/inner/leaf.ttl", "ex:L sh:name \"leaf\" .")?;
    // Would be picked if imports were resolved against the root directory
    document(&dir, "inner/leaf.ttl", "ex:Wrong sh:name \"wrong\" .")?;
    let graph = load_shapes(dir.child("root.ttl").path())?;
    assert_eq!(shape_names(&graph), ["\"leaf\""]);
    Ok(())
}

#[test]
fn non_local_imports_are_ignored() -> Result<()> {
    let dir = TempDir::new()?;
    document(
        &dir,
        "root.ttl",
        "<> code:imports <https://cube.link/shapes>, [] .\nex:R sh:name \"r\" .",
    )?;
    let graph = load_shapes(dir.child("root.ttl").path())?;
    assert_eq!(shape_names(&graph), ["\"r\""]);
    Ok(())
}

#[test]
fn missing_root_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    let err = load_shapes(dir.child("nope.ttl").path()).unwrap_err();
    assert!(matches!(err, ImportError::NotFound { .. }), "{err}");
    Ok(())
}

#[test]
fn parse_errors_in_imports_are_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    document(&dir, "root.ttl", "<> code:imports <./broken> .")?;
    dir.child("broken.ttl").write_str("ex:oops a .")?;
    let err = load_shapes(dir.child("root.ttl").path()).unwrap_err();
    let ImportError::Parse { path, .. } = &err else {
        panic!("unexpected error {err}");
    };
    assert!(path.ends_with("broken.ttl"));
    Ok(())
}

#[test]
fn documents_are_parsed_with_their_own_base() -> Result<()> {
    let dir = TempDir::new()?;
    document(&dir, "root.ttl", "<> code:imports <./base> .")?;
    document(&dir, "base.ttl", "<#Shape> sh:name \"b\" .")?;
    let graph = load_shapes(dir.child("root.ttl").path())?;
    let base = cubeshapes::file_base_iri(dir.child("base.ttl").path())?;
    let triple = graph
        .iter()
        .next()
        .map(Triple::from)
        .ok_or_else(|| anyhow::anyhow!("empty graph"))?;
    assert_eq!(triple.subject.to_string(), format!("<{base}#Shape>"));
    Ok(())
}

#[test]
fn blank_node_labels_are_scoped_to_their_document() -> Result<()> {
    let dir = TempDir::new()?;
    document(
        &dir,
        "root.ttl",
        "<> code:imports <./base> .\nex:A sh:property _:p .\n_:p sh:path ex:a .",
    )?;
    document(&dir, "base.ttl", "ex:B sh:property _:p .\n_:p sh:path ex:b .")?;

    let graph = load_shapes(dir.child("root.ttl").path())?;
    assert_eq!(graph.len(), 4);
    let path_holders = graph
        .triples_for_predicate(NamedNodeRef::new_unchecked(
            "http://www.w3.org/ns/shacl#path",
        ))
        .map(|t| t.subject.into_owned())
        .collect::<HashSet<_>>();
    assert_eq!(path_holders.len(), 2);
    Ok(())
}
