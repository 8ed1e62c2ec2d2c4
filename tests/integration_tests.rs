//! Integration tests for the complete Ontograph pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - XSD text → schema tree → transformation → triple store
//! - Triple store → Turtle → file round-trip
//! - Triple store → ontology index (downstream mapper contract)
//!
//! Run with: cargo test --test integration_tests

use std::fs;
use tempfile::tempdir;

use ontograph_owl::{OntologyIndex, Transformer};
use ontograph_rdf::{turtle, vocab, Term};
use ontograph_xsd::parse_schema;

const BASE: &str = "http://example.org/fleet#";

const FLEET_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:annotation>
    <xs:documentation>Rolling stock reference data.</xs:documentation>
  </xs:annotation>

  <xs:element name="WagonNumber" type="xs:string">
    <xs:annotation>
      <xs:documentation>European wagon number.</xs:documentation>
    </xs:annotation>
  </xs:element>

  <xs:complexType name="Numeric3-3">
    <xs:simpleContent>
      <xs:restriction base="xs:decimal"/>
    </xs:simpleContent>
  </xs:complexType>

  <xs:simpleType name="BrakeRegime">
    <xs:annotation>
      <xs:documentation>G = Goods braking. P = Passenger braking.</xs:documentation>
    </xs:annotation>
    <xs:restriction base="xs:string">
      <xs:enumeration value="G"/>
      <xs:enumeration value="P"/>
    </xs:restriction>
  </xs:simpleType>

  <xs:complexType name="Wagon">
    <xs:sequence>
      <xs:element ref="WagonNumber"/>
      <xs:element name="TareWeight" type="Numeric3-3"/>
      <xs:element name="Brake" type="BrakeRegime"/>
    </xs:sequence>
  </xs:complexType>

  <xs:complexType name="Consignment">
    <xs:sequence>
      <xs:element ref="WagonNumber"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>
"#;

#[test]
fn test_full_pipeline_entities() {
    let tree = parse_schema(FLEET_XSD).expect("schema parses");
    let store = Transformer::new().transform(&tree, BASE);

    let class = |local: &str| Term::iri(format!("{BASE}{local}"));

    for name in ["Wagon", "Consignment"] {
        assert!(
            store.contains(&class(name), vocab::RDF_TYPE, &Term::iri(vocab::OWL_CLASS)),
            "{name} should be a class"
        );
    }
    // The numeric helper type and the enumerated type stay out of the class set.
    assert!(!store.contains(
        &class("Numeric3_3"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS)
    ));
    assert!(!store.contains(
        &class("BrakeRegime"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS)
    ));

    // Numeric override: decimal range, datatype typing only.
    let tare = class("tareWeight");
    assert_eq!(
        store.objects_of(&tare, vocab::RDFS_RANGE),
        vec![Term::iri(vocab::XSD_DECIMAL)]
    );

    // Shared reference: one union domain over both owners.
    let wagon_number = class("wagonNumber");
    let domains = store.objects_of(&wagon_number, vocab::RDFS_DOMAIN);
    assert_eq!(domains.len(), 1);
    assert!(matches!(domains[0], Term::Blank(_)));

    // Enumerated type becomes a concept scheme with extracted definitions.
    assert!(store.contains(
        &class("BrakeRegime"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::SKOS_CONCEPT_SCHEME)
    ));
    let g_defs = store.objects_of(&class("BrakeRegime_G"), vocab::SKOS_DEFINITION);
    assert!(
        g_defs.iter().any(|d| matches!(
            d,
            Term::Literal { lexical, .. } if lexical.contains("Goods braking")
        )),
        "expected an extracted definition for G, got {g_defs:?}"
    );
}

#[test]
fn test_turtle_file_round_trip() {
    let tree = parse_schema(FLEET_XSD).expect("schema parses");
    let store = Transformer::new().transform(&tree, BASE);
    let ttl = turtle::write_turtle(&store, Some(BASE));

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("fleet.ttl");
    fs::write(&path, &ttl).expect("write");
    let read_back = fs::read_to_string(&path).expect("read");
    assert_eq!(ttl, read_back);

    // Deterministic across independent runs.
    let again = turtle::write_turtle(
        &Transformer::new().transform(&parse_schema(FLEET_XSD).expect("parses"), BASE),
        Some(BASE),
    );
    assert_eq!(ttl, again);
}

#[test]
fn test_index_contract_for_instance_mapper() {
    let tree = parse_schema(FLEET_XSD).expect("schema parses");
    let store = Transformer::new().transform(&tree, BASE);
    let index = OntologyIndex::from_store(&store);

    assert_eq!(index.class_uri("Wagon"), Some(&*format!("{BASE}Wagon")));
    assert_eq!(index.class_uri("WAGON"), Some(&*format!("{BASE}Wagon")));
    assert_eq!(
        index.property_uri("TareWeight"),
        Some(&*format!("{BASE}tareWeight"))
    );
    assert_eq!(
        index.concept_uri("BrakeRegime", "G"),
        Some(&*format!("{BASE}BrakeRegime_G"))
    );
    assert_eq!(index.datatype("tareWeight"), vocab::XSD_DECIMAL);
}
