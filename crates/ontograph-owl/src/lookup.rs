//! Read-only lookups over a finished ontology.
//!
//! This is the contract the downstream instance-data mapper consumes: class
//! IRI by declaration name, property IRI by declaration name, and concept
//! IRI by (scheme name, value) pair: exact match first, case-insensitive
//! fallback after, with a `<Name>Type` convenience fallback for classes.

use std::collections::BTreeMap;

use ontograph_rdf::{vocab, Term, TripleStore};

#[derive(Debug, Clone, Default)]
pub struct OntologyIndex {
    classes: BTreeMap<String, String>,
    properties: BTreeMap<String, String>,
    datatypes: BTreeMap<String, String>,
    concepts: BTreeMap<String, String>,
}

impl OntologyIndex {
    /// Build the index by scanning the store's classes, properties, schemes
    /// and concepts. Names come from labels, falling back to IRI local
    /// names.
    pub fn from_store(store: &TripleStore) -> Self {
        let mut index = Self::default();

        for class in store.subjects_with(vocab::RDF_TYPE, &Term::iri(vocab::OWL_CLASS)) {
            if let Some(name) = subject_name(store, &class) {
                if let Some(iri) = class.as_iri() {
                    index.classes.entry(name).or_insert_with(|| iri.to_string());
                }
            }
        }

        for type_iri in [vocab::OWL_DATATYPE_PROPERTY, vocab::OWL_OBJECT_PROPERTY] {
            let datatype = type_iri == vocab::OWL_DATATYPE_PROPERTY;
            for property in store.subjects_with(vocab::RDF_TYPE, &Term::iri(type_iri)) {
                let Some(name) = subject_name(store, &property) else {
                    continue;
                };
                let Some(iri) = property.as_iri() else { continue };
                index
                    .properties
                    .entry(name.clone())
                    .or_insert_with(|| iri.to_string());
                if datatype {
                    if let Some(range) = store
                        .objects_of(&property, vocab::RDFS_RANGE)
                        .into_iter()
                        .find_map(|o| o.as_iri().map(str::to_string))
                        .filter(|r| vocab::is_literal_datatype(r))
                    {
                        index.datatypes.entry(name).or_insert(range);
                    }
                }
            }
        }

        for concept in store.subjects_with(vocab::RDF_TYPE, &Term::iri(vocab::SKOS_CONCEPT)) {
            let Some(scheme) = store
                .objects_of(&concept, vocab::SKOS_IN_SCHEME)
                .into_iter()
                .next()
            else {
                continue;
            };
            let Some(scheme_name) = subject_name(store, &scheme) else {
                continue;
            };
            let Some(value) = store
                .objects_of(&concept, vocab::SKOS_PREF_LABEL)
                .into_iter()
                .find_map(|o| match o {
                    Term::Literal { lexical, .. } => Some(lexical),
                    _ => None,
                })
            else {
                continue;
            };
            if let Some(iri) = concept.as_iri() {
                index
                    .concepts
                    .entry(format!("{scheme_name}:{value}"))
                    .or_insert_with(|| iri.to_string());
            }
        }

        tracing::debug!(
            classes = index.classes.len(),
            properties = index.properties.len(),
            concepts = index.concepts.len(),
            "built ontology index"
        );
        index
    }

    /// Class IRI for a declaration name. Falls back to case-insensitive
    /// matching, then to the `<Name>Type` naming convention.
    pub fn class_uri(&self, name: &str) -> Option<&str> {
        if let Some(uri) = self.classes.get(name) {
            return Some(uri);
        }
        if let Some(uri) = case_insensitive(&self.classes, name) {
            return Some(uri);
        }
        self.classes.get(&format!("{name}Type")).map(String::as_str)
    }

    /// Property IRI for a declaration name, case-insensitive fallback.
    pub fn property_uri(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .map(String::as_str)
            .or_else(|| case_insensitive(&self.properties, name))
    }

    /// Concept IRI by (scheme name, value), case-insensitive fallback.
    pub fn concept_uri(&self, scheme: &str, value: &str) -> Option<&str> {
        let key = format!("{scheme}:{value}");
        self.concepts
            .get(&key)
            .map(String::as_str)
            .or_else(|| case_insensitive(&self.concepts, &key))
    }

    /// Literal datatype recorded for a property name; string when unknown.
    pub fn datatype(&self, name: &str) -> &str {
        self.datatypes
            .get(name)
            .map(String::as_str)
            .or_else(|| case_insensitive(&self.datatypes, name))
            .unwrap_or(vocab::XSD_STRING)
    }
}

fn case_insensitive<'a>(map: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    let lower = name.to_lowercase();
    map.iter()
        .find(|(k, _)| k.to_lowercase() == lower)
        .map(|(_, v)| v.as_str())
}

/// Label of a subject, else its IRI local name.
fn subject_name(store: &TripleStore, subject: &Term) -> Option<String> {
    store
        .objects_of(subject, vocab::RDFS_LABEL)
        .into_iter()
        .find_map(|o| match o {
            Term::Literal { lexical, .. } => Some(lexical),
            _ => None,
        })
        .or_else(|| subject.local_name().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> TripleStore {
        let mut store = TripleStore::new();
        let class = Term::iri("http://example.org/onto#Wagon");
        store.insert(class.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_CLASS));
        store.insert(class, vocab::RDFS_LABEL, Term::literal("Wagon"));

        let prop = Term::iri("http://example.org/onto#numberOfAxles");
        store.insert(
            prop.clone(),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_DATATYPE_PROPERTY),
        );
        store.insert(prop.clone(), vocab::RDFS_LABEL, Term::literal("numberOfAxles"));
        store.insert(
            prop,
            vocab::RDFS_RANGE,
            Term::iri("http://www.w3.org/2001/XMLSchema#integer"),
        );

        let scheme = Term::iri("http://example.org/onto#BrakeType");
        store.insert(
            scheme.clone(),
            vocab::RDF_TYPE,
            Term::iri(vocab::SKOS_CONCEPT_SCHEME),
        );
        store.insert(scheme.clone(), vocab::RDFS_LABEL, Term::literal("BrakeType"));
        let concept = Term::iri("http://example.org/onto#BrakeType_G");
        store.insert(
            concept.clone(),
            vocab::RDF_TYPE,
            Term::iri(vocab::SKOS_CONCEPT),
        );
        store.insert(concept.clone(), vocab::SKOS_IN_SCHEME, scheme);
        store.insert(concept, vocab::SKOS_PREF_LABEL, Term::literal("G"));

        store
    }

    #[test]
    fn exact_and_case_insensitive_class_lookup() {
        let index = OntologyIndex::from_store(&sample_store());
        assert_eq!(
            index.class_uri("Wagon"),
            Some("http://example.org/onto#Wagon")
        );
        assert_eq!(
            index.class_uri("wagon"),
            Some("http://example.org/onto#Wagon")
        );
        assert_eq!(index.class_uri("Locomotive"), None);
    }

    #[test]
    fn property_lookup_and_datatype_default() {
        let index = OntologyIndex::from_store(&sample_store());
        assert_eq!(
            index.property_uri("NumberOfAxles"),
            Some("http://example.org/onto#numberOfAxles")
        );
        assert_eq!(
            index.datatype("numberOfAxles"),
            "http://www.w3.org/2001/XMLSchema#integer"
        );
        assert_eq!(index.datatype("unknownField"), vocab::XSD_STRING);
    }

    #[test]
    fn concept_lookup_by_scheme_and_value() {
        let index = OntologyIndex::from_store(&sample_store());
        assert_eq!(
            index.concept_uri("BrakeType", "G"),
            Some("http://example.org/onto#BrakeType_G")
        );
        assert_eq!(
            index.concept_uri("braketype", "g"),
            Some("http://example.org/onto#BrakeType_G")
        );
        assert_eq!(index.concept_uri("BrakeType", "Z"), None);
    }
}
