//! End-to-end pipeline tests over small inline schemas.

use ontograph_owl::{OntologyIndex, SpecialCases, Transformer};
use ontograph_rdf::{turtle, vocab, Term, TripleStore};

const BASE: &str = "http://example.org/onto#";

fn transform(xsd: &str) -> TripleStore {
    Transformer::new()
        .transform_str(xsd, BASE)
        .expect("schema parses")
}

fn iri(local: &str) -> Term {
    Term::iri(format!("{BASE}{local}"))
}

fn has(store: &TripleStore, s: &Term, p: &str, o: &Term) -> bool {
    store.contains(s, p, o)
}

// ============================================================================
// Person scenario (named complex type + top-level element + inline enum)
// ============================================================================

const PERSON_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Person">
    <xs:sequence>
      <xs:element name="firstName" type="xs:string"/>
      <xs:element name="age" type="xs:integer"/>
      <xs:element name="status">
        <xs:simpleType>
          <xs:restriction base="xs:string">
            <xs:enumeration value="active"/>
            <xs:enumeration value="inactive"/>
          </xs:restriction>
        </xs:simpleType>
      </xs:element>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="Person" type="Person"/>
</xs:schema>
"#;

#[test]
fn person_schema_yields_expected_entities() {
    let store = transform(PERSON_XSD);

    assert!(has(
        &store,
        &iri("Person"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS)
    ));
    assert_eq!(
        store
            .subjects_with(vocab::RDF_TYPE, &Term::iri(vocab::OWL_CLASS))
            .len(),
        1,
        "only the Person class is expected"
    );

    for (prop, range) in [
        ("firstName", vocab::XSD_STRING),
        ("age", "http://www.w3.org/2001/XMLSchema#integer"),
        ("status", vocab::XSD_STRING),
    ] {
        let subject = iri(prop);
        assert!(
            has(&store, &subject, vocab::RDF_TYPE, &Term::iri(vocab::OWL_DATATYPE_PROPERTY)),
            "{prop} should be a datatype property"
        );
        assert!(
            has(&store, &subject, vocab::RDFS_RANGE, &Term::iri(range)),
            "{prop} should range over {range}"
        );
        assert!(
            has(&store, &subject, vocab::RDFS_DOMAIN, &iri("Person")),
            "{prop} should be domained on Person"
        );
    }

    assert!(has(
        &store,
        &iri("status_enum"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::SKOS_CONCEPT_SCHEME)
    ));
    for value in ["active", "inactive"] {
        let concept = iri(&format!("status_enum_{value}"));
        assert!(has(
            &store,
            &concept,
            vocab::RDF_TYPE,
            &Term::iri(vocab::SKOS_CONCEPT)
        ));
        assert!(has(
            &store,
            &concept,
            vocab::SKOS_IN_SCHEME,
            &iri("status_enum")
        ));
        assert!(has(
            &store,
            &concept,
            vocab::SKOS_PREF_LABEL,
            &Term::literal(value)
        ));
    }

    assert!(store
        .subjects_with(vocab::RDF_TYPE, &Term::iri(vocab::OWL_OBJECT_PROPERTY))
        .is_empty());
}

#[test]
fn person_schema_round_trips_byte_identically() {
    let first = turtle::write_turtle(&transform(PERSON_XSD), Some(BASE));
    let second = turtle::write_turtle(&transform(PERSON_XSD), Some(BASE));
    assert_eq!(first, second);
}

#[test]
fn ontology_index_serves_the_downstream_lookups() {
    let store = transform(PERSON_XSD);
    let index = OntologyIndex::from_store(&store);

    assert_eq!(index.class_uri("Person"), Some(&*format!("{BASE}Person")));
    assert_eq!(index.class_uri("person"), Some(&*format!("{BASE}Person")));
    assert_eq!(
        index.property_uri("FirstName"),
        Some(&*format!("{BASE}firstName"))
    );
    assert_eq!(
        index.concept_uri("Enumeration for status", "active"),
        Some(&*format!("{BASE}status_enum_active"))
    );
}

// ============================================================================
// Numeric custom types
// ============================================================================

const NUMERIC_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Numeric5-5">
    <xs:simpleContent>
      <xs:restriction base="xs:decimal"/>
    </xs:simpleContent>
  </xs:complexType>
  <xs:complexType name="Wagon">
    <xs:sequence>
      <xs:element name="LoadLimit" type="Numeric5-5"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>
"#;

#[test]
fn numeric_type_produces_exactly_one_decimal_range() {
    let store = transform(NUMERIC_XSD);
    let prop = iri("loadLimit");

    let ranges = store.objects_of(&prop, vocab::RDFS_RANGE);
    assert_eq!(ranges, vec![Term::iri(vocab::XSD_DECIMAL)]);
    assert!(has(
        &store,
        &prop,
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_DATATYPE_PROPERTY)
    ));
    assert!(!has(
        &store,
        &prop,
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_OBJECT_PROPERTY)
    ));
    assert!(has(&store, &prop, vocab::RDFS_DOMAIN, &iri("Wagon")));

    // The numeric type itself never becomes a class.
    assert!(!has(
        &store,
        &iri("Numeric5_5"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS)
    ));
}

// ============================================================================
// Multi-owner references and union domains
// ============================================================================

const UNION_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Remark" type="xs:string"/>
  <xs:complexType name="Consignment">
    <xs:sequence><xs:element ref="Remark"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="Wagon">
    <xs:sequence><xs:element ref="Remark"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="Route">
    <xs:sequence><xs:element ref="Remark"/></xs:sequence>
  </xs:complexType>
</xs:schema>
"#;

#[test]
fn shared_reference_gets_a_union_domain() {
    let store = transform(UNION_XSD);
    let prop = iri("remark");

    let domains = store.objects_of(&prop, vocab::RDFS_DOMAIN);
    assert_eq!(domains.len(), 1, "exactly one domain triple expected");
    let union = domains.into_iter().next().unwrap();
    assert!(
        matches!(union, Term::Blank(_)),
        "domain should be an anonymous union class, got {union:?}"
    );

    assert!(has(
        &store,
        &union,
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS)
    ));

    // Walk the union's member list.
    let list_head = store
        .objects_of(&union, vocab::OWL_UNION_OF)
        .into_iter()
        .next()
        .expect("unionOf list");
    let mut members = Vec::new();
    let mut cell = list_head;
    loop {
        members.extend(store.objects_of(&cell, vocab::RDF_FIRST));
        let rest = store
            .objects_of(&cell, vocab::RDF_REST)
            .into_iter()
            .next()
            .expect("list rest");
        if rest.as_iri() == Some(vocab::RDF_NIL) {
            break;
        }
        cell = rest;
    }
    assert_eq!(
        members,
        vec![iri("Consignment"), iri("Route"), iri("Wagon")],
        "union members in deterministic order"
    );
}

// ============================================================================
// Enumeration definition extraction
// ============================================================================

const ENUM_DOC_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="OptionCode">
    <xs:annotation>
      <xs:documentation>A = Alpha option. B = Beta option.</xs:documentation>
    </xs:annotation>
    <xs:restriction base="xs:string">
      <xs:enumeration value="A"/>
      <xs:enumeration value="B"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>
"#;

#[test]
fn enum_definitions_are_extracted_from_annotation_prose() {
    let store = transform(ENUM_DOC_XSD);

    let defs = |local: &str| -> Vec<String> {
        store
            .objects_of(&iri(local), vocab::SKOS_DEFINITION)
            .into_iter()
            .filter_map(|o| match o {
                Term::Literal { lexical, .. } => Some(lexical),
                _ => None,
            })
            .collect()
    };
    assert_eq!(defs("OptionCode_A"), vec!["Alpha option.".to_string()]);
    assert_eq!(defs("OptionCode_B"), vec!["Beta option.".to_string()]);

    // The enumerated named simple type never becomes a class.
    assert!(!has(
        &store,
        &iri("OptionCode"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS)
    ));
}

// ============================================================================
// Choice groups
// ============================================================================

const CHOICE_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Consignment">
    <xs:complexType>
      <xs:choice>
        <xs:element name="WagonNumber" type="xs:string"/>
        <xs:element name="TrainNumber" type="xs:string"/>
      </xs:choice>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#;

#[test]
fn choice_options_become_commented_properties() {
    let store = transform(CHOICE_XSD);

    for prop in ["wagonNumber", "trainNumber"] {
        let subject = iri(prop);
        assert!(
            has(&store, &subject, vocab::RDF_TYPE, &Term::iri(vocab::OWL_DATATYPE_PROPERTY)),
            "{prop} should be a datatype property"
        );
        assert!(
            has(&store, &subject, vocab::RDFS_DOMAIN, &iri("Consignment")),
            "{prop} should be domained on the enclosing element's class"
        );
        let comments = store.objects_of(&subject, vocab::RDFS_COMMENT);
        assert!(
            comments.iter().any(|c| matches!(
                c,
                Term::Literal { lexical, .. } if lexical.contains("expected to carry a value")
            )),
            "{prop} should carry the informational choice comment"
        );
    }
}

// ============================================================================
// Sandwich elements
// ============================================================================

const SANDWICH_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Wagon">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="BrakeUnit">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="brakePower" type="xs:decimal"/>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#;

#[test]
fn sandwich_elements_are_both_class_and_object_property() {
    let store = transform(SANDWICH_XSD);

    assert!(has(
        &store,
        &iri("BrakeUnit"),
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS)
    ));
    let prop = iri("brakeUnit");
    assert!(has(
        &store,
        &prop,
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_OBJECT_PROPERTY)
    ));
    assert!(has(&store, &prop, vocab::RDFS_RANGE, &iri("BrakeUnit")));
    assert!(has(&store, &prop, vocab::RDFS_DOMAIN, &iri("Wagon")));

    // The nested simple field hangs off the inner class.
    assert!(has(
        &store,
        &iri("brakePower"),
        vocab::RDFS_DOMAIN,
        &iri("BrakeUnit")
    ));
}

// ============================================================================
// Special-case table
// ============================================================================

#[test]
fn forced_datatype_overrides_structural_rules() {
    let xsd = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Wagon">
    <xs:sequence>
      <xs:element name="AirBrakedMass" type="BrakedMassType"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="BrakedMassType">
    <xs:sequence><xs:element name="value" type="xs:decimal"/></xs:sequence>
  </xs:complexType>
</xs:schema>
"#;
    let special = SpecialCases::from_json(
        r#"{ "force_datatype": { "airBrakedMass": { "range": "xsd:decimal" } } }"#,
    )
    .expect("special cases parse");

    let store = Transformer::new()
        .with_special_cases(special)
        .transform_str(xsd, BASE)
        .expect("parses");

    let prop = iri("airBrakedMass");
    assert!(has(
        &store,
        &prop,
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_DATATYPE_PROPERTY)
    ));
    assert!(!has(
        &store,
        &prop,
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_OBJECT_PROPERTY)
    ));
    assert_eq!(
        store.objects_of(&prop, vocab::RDFS_RANGE),
        vec![Term::iri(vocab::XSD_DECIMAL)]
    );
}

// ============================================================================
// Ontology header
// ============================================================================

#[test]
fn ontology_header_is_asserted() {
    let store = transform(PERSON_XSD);
    let ontology = Term::iri("http://example.org/onto");
    assert!(has(
        &store,
        &ontology,
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_ONTOLOGY)
    ));
}
