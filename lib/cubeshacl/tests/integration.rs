#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use cubeshacl::{
    ConstraintComponent, PropertyPath, Severity, ShaclError, ShaclParseError, ShaclValidator,
    ShapesGraph, ValidationReport,
};
use oxrdf::{Graph, NamedNode};
use oxttl::TurtleParser;

const PREFIXES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.com/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
";

fn parse(turtle: &str) -> Result<Graph> {
    let mut graph = Graph::new();
    for triple in TurtleParser::new().for_slice(format!("{PREFIXES}{turtle}").as_bytes()) {
        graph.insert(&triple?);
    }
    Ok(graph)
}

fn validate(shapes: &str, data: &str) -> Result<ValidationReport> {
    let shapes = ShapesGraph::from_graph(&parse(shapes)?)?;
    Ok(ShaclValidator::new(shapes).validate(&parse(data)?)?)
}

fn ex(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

#[test]
fn target_class_follows_subclasses() -> Result<()> {
    let shapes = "ex:PersonShape a sh:NodeShape ;
        sh:targetClass ex:Person ;
        sh:property [ sh:path ex:name ; sh:minCount 1 ] .";
    let data = "ex:Student rdfs:subClassOf ex:Person .
        ex:alice a ex:Student .";
    let report = validate(shapes, data)?;
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].focus_node, ex("alice").into());
    Ok(())
}

#[test]
fn subjects_and_objects_of_targets() -> Result<()> {
    let shapes = "ex:S sh:targetSubjectsOf ex:knows ; sh:nodeKind sh:IRI .
        ex:O sh:targetObjectsOf ex:knows ; sh:nodeKind sh:IRI .";
    assert!(validate(shapes, "ex:a ex:knows ex:b .")?.conforms());
    let report = validate(shapes, "ex:a ex:knows [] .")?;
    assert_eq!(report.results().len(), 1);
    assert_eq!(
        report.results()[0].source_constraint_component,
        ConstraintComponent::NodeKind
    );
    Ok(())
}

#[test]
fn sequence_and_inverse_paths() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:child ;
        sh:property [ sh:path ( [ sh:inversePath ex:parentOf ] ex:name ) ; sh:minCount 1 ] .";
    assert!(validate(shapes, "ex:mum ex:parentOf ex:child ; ex:name \"Ann\" .")?.conforms());
    let report = validate(shapes, "ex:mum ex:parentOf ex:child .")?;
    assert!(!report.conforms());
    assert!(matches!(
        report.results()[0].result_path,
        Some(PropertyPath::Sequence(_))
    ));
    Ok(())
}

#[test]
fn logical_constraints() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:a ;
        sh:property [ sh:path ex:v ;
            sh:or ( [ sh:datatype xsd:integer ] [ sh:datatype xsd:string ] ) ;
            sh:not [ sh:hasValue 0 ] ] .";
    assert!(validate(shapes, "ex:a ex:v 1, \"one\" .")?.conforms());
    let report = validate(shapes, "ex:a ex:v 0, 1.5 .")?;
    let components = report
        .results()
        .iter()
        .map(|r| r.source_constraint_component)
        .collect::<Vec<_>>();
    assert!(components.contains(&ConstraintComponent::Not));
    assert!(components.contains(&ConstraintComponent::Or));
    Ok(())
}

#[test]
fn xone_requires_exactly_one_shape() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:a ;
        sh:xone ( [ sh:property [ sh:path ex:p ; sh:minCount 1 ] ]
                  [ sh:property [ sh:path ex:q ; sh:minCount 1 ] ] ) .";
    assert!(validate(shapes, "ex:a ex:p 1 .")?.conforms());
    assert!(!validate(shapes, "ex:a ex:p 1 ; ex:q 1 .")?.conforms());
    assert!(!validate(shapes, "ex:b ex:p 1 .")?.conforms());
    Ok(())
}

#[test]
fn disjoint_qualified_value_shapes() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:hand ;
        sh:property ex:ThumbShape, ex:FingerShape .
        ex:ThumbShape sh:path ex:digit ;
            sh:qualifiedValueShape [ sh:class ex:Thumb ] ;
            sh:qualifiedValueShapesDisjoint true ;
            sh:qualifiedMinCount 1 ; sh:qualifiedMaxCount 1 .
        ex:FingerShape sh:path ex:digit ;
            sh:qualifiedValueShape [ sh:class ex:Finger ] ;
            sh:qualifiedValueShapesDisjoint true ;
            sh:qualifiedMinCount 4 ; sh:qualifiedMaxCount 4 .";
    let hand = "ex:hand ex:digit ex:d1, ex:d2, ex:d3, ex:d4, ex:d5 .
        ex:d1 a ex:Thumb .
        ex:d2 a ex:Finger . ex:d3 a ex:Finger . ex:d4 a ex:Finger . ex:d5 a ex:Finger .";
    assert!(validate(shapes, hand)?.conforms());
    let report = validate(shapes, &format!("{hand} ex:d1 a ex:Finger ."))?;
    assert_eq!(report.results().len(), 1);
    assert_eq!(
        report.results()[0].source_constraint_component,
        ConstraintComponent::QualifiedMinCount
    );
    Ok(())
}

#[test]
fn closed_shapes() -> Result<()> {
    let shapes = "ex:S sh:targetClass ex:Point ;
        sh:closed true ;
        sh:ignoredProperties ( <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ) ;
        sh:property [ sh:path ex:x ] , [ sh:path ex:y ] .";
    assert!(validate(shapes, "ex:p a ex:Point ; ex:x 1 ; ex:y 2 .")?.conforms());
    let report = validate(shapes, "ex:p a ex:Point ; ex:x 1 ; ex:z 3 .")?;
    assert_eq!(report.results().len(), 1);
    let result = &report.results()[0];
    assert_eq!(result.source_constraint_component, ConstraintComponent::Closed);
    assert_eq!(result.result_path, Some(PropertyPath::Predicate(ex("z"))));
    Ok(())
}

#[test]
fn language_constraints() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:a ;
        sh:property [ sh:path ex:label ; sh:languageIn ( \"de\" \"fr\" ) ; sh:uniqueLang true ] .";
    assert!(validate(shapes, "ex:a ex:label \"Haus\"@de-CH, \"maison\"@fr .")?.conforms());
    let report = validate(shapes, "ex:a ex:label \"Haus\"@de, \"Gebäude\"@DE, \"house\"@en .")?;
    let components = report
        .results()
        .iter()
        .map(|r| r.source_constraint_component)
        .collect::<Vec<_>>();
    assert_eq!(
        components,
        [ConstraintComponent::LanguageIn, ConstraintComponent::UniqueLang]
    );
    Ok(())
}

#[test]
fn property_pair_constraints() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:a ;
        sh:property [ sh:path ex:start ; sh:lessThan ex:end ] .";
    assert!(validate(shapes, "ex:a ex:start 1 ; ex:end 2 .")?.conforms());
    assert!(!validate(shapes, "ex:a ex:start 2 ; ex:end 2 .")?.conforms());
    assert!(!validate(shapes, "ex:a ex:start 2 ; ex:end \"two\" .")?.conforms());
    Ok(())
}

#[test]
fn in_and_has_value() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:a ;
        sh:property [ sh:path ex:color ; sh:in ( ex:red ex:green ) ; sh:hasValue ex:red ] .";
    assert!(validate(shapes, "ex:a ex:color ex:red, ex:green .")?.conforms());
    let report = validate(shapes, "ex:a ex:color ex:blue .")?;
    assert_eq!(report.results().len(), 2);
    Ok(())
}

#[test]
fn severity_and_message_are_reported() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:a ;
        sh:property [ sh:path ex:name ; sh:minCount 1 ;
            sh:severity sh:Info ; sh:message \"A name is expected\" ] .";
    let report = validate(shapes, "")?;
    assert!(!report.conforms());
    assert_eq!(report.count(Severity::Info), 1);
    assert_eq!(
        report.results()[0].result_message.as_deref(),
        Some("A name is expected")
    );
    let graph = report.to_graph();
    assert!(!graph.is_empty());
    Ok(())
}

#[test]
fn malformed_list_is_a_parse_error() -> Result<()> {
    let shapes = parse("ex:S sh:targetNode ex:a ; sh:in ex:notAList .")?;
    assert!(matches!(
        ShapesGraph::from_graph(&shapes),
        Err(ShaclParseError::InvalidRdfList { .. })
    ));
    Ok(())
}

#[test]
fn unbounded_recursion_is_an_error() -> Result<()> {
    let shapes = ShapesGraph::from_graph(&parse(
        "ex:S sh:targetNode ex:a ; sh:property [ sh:path ex:p ; sh:node ex:S ] .",
    )?)?;
    let data = parse("ex:a ex:p ex:a .")?;
    assert!(matches!(
        ShaclValidator::new(shapes).validate(&data),
        Err(ShaclError::Validation(_))
    ));
    Ok(())
}

#[test]
fn integers_larger_than_machine_words() -> Result<()> {
    let shapes = "ex:S sh:targetNode ex:a ;
        sh:property [ sh:path ex:v ; sh:datatype xsd:integer ; sh:minInclusive 0 ] .";
    assert!(validate(shapes, "ex:a ex:v 12345678901234567890123 .")?.conforms());
    let report = validate(shapes, "ex:a ex:v -12345678901234567890123 .")?;
    assert_eq!(report.results().len(), 1);
    assert_eq!(
        report.results()[0].source_constraint_component,
        ConstraintComponent::MinInclusive
    );
    Ok(())
}
