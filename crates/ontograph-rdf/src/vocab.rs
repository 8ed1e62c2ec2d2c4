//! Vocabulary constants: RDF, RDFS, OWL, SKOS, DC and the built-in XSD
//! literal datatype table.

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const DC_NS: &str = "http://purl.org/dc/terms/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";

pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const OWL_FUNCTIONAL_PROPERTY: &str = "http://www.w3.org/2002/07/owl#FunctionalProperty";
pub const OWL_UNION_OF: &str = "http://www.w3.org/2002/07/owl#unionOf";

pub const SKOS_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
pub const SKOS_CONCEPT_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";
pub const SKOS_IN_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#inScheme";
pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const SKOS_DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";

pub const DC_TITLE: &str = "http://purl.org/dc/terms/title";
pub const DC_CREATED: &str = "http://purl.org/dc/terms/created";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_TOKEN: &str = "http://www.w3.org/2001/XMLSchema#token";

/// Built-in XML Schema literal datatypes recognized by the transformation.
const XSD_BUILTINS: &[&str] = &[
    "string",
    "boolean",
    "decimal",
    "integer",
    "nonNegativeInteger",
    "positiveInteger",
    "int",
    "long",
    "short",
    "byte",
    "unsignedInt",
    "unsignedLong",
    "unsignedShort",
    "float",
    "double",
    "date",
    "dateTime",
    "time",
    "duration",
    "gYear",
    "gYearMonth",
    "gMonth",
    "gDay",
    "anyURI",
    "base64Binary",
    "hexBinary",
    "token",
    "normalizedString",
    "language",
    "Name",
    "NCName",
    "NMTOKEN",
    "ID",
    "IDREF",
];

/// Full IRI for a built-in XSD datatype local name, if it is one.
pub fn xsd_datatype(local: &str) -> Option<String> {
    XSD_BUILTINS
        .iter()
        .find(|b| **b == local)
        .map(|b| format!("{XSD_NS}{b}"))
}

/// Whether an IRI denotes a literal datatype (anything in the XSD namespace).
pub fn is_literal_datatype(iri: &str) -> bool {
    iri.starts_with(XSD_NS)
}

/// String-valued datatypes that serve as stricter aliases of `xsd:string`.
pub fn is_string_alias(iri: &str) -> bool {
    matches!(
        iri.strip_prefix(XSD_NS),
        Some("token" | "normalizedString" | "language" | "Name" | "NCName" | "NMTOKEN")
    )
}

/// Fragment after the last `#` or `/`.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_resolves_common_types() {
        assert_eq!(xsd_datatype("string").as_deref(), Some(XSD_STRING));
        assert_eq!(xsd_datatype("decimal").as_deref(), Some(XSD_DECIMAL));
        assert!(xsd_datatype("NotAType").is_none());
    }

    #[test]
    fn string_aliases_exclude_string_itself() {
        assert!(is_string_alias(XSD_TOKEN));
        assert!(!is_string_alias(XSD_STRING));
        assert!(!is_string_alias("http://example.org/Thing"));
    }

    #[test]
    fn local_name_splits_on_hash_and_slash() {
        assert_eq!(local_name("http://example.org/base#Person"), "Person");
        assert_eq!(local_name("http://example.org/base/Person"), "Person");
    }
}
