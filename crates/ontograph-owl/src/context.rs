//! Per-run transformation state.
//!
//! One context per transformation: it owns the output triple store, the URI
//! registry, the per-node processed ledger, the metadata side-table, and the
//! accumulators the Cleanup phase consumes. Nothing here is global: running
//! two transformations back to back cannot leak state between them.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use ontograph_rdf::{vocab, Term, TripleStore};
use ontograph_xsd::NodeId;

use crate::special::SpecialCases;
use crate::uri::{lower_case_initial, NameEncoding, UriRegistry};

// ============================================================================
// Side-table records
// ============================================================================

/// Metadata a producer rule attaches to a not-yet-visited node so a later
/// rule knows who owns it. Merging fills absent fields and never clears the
/// sandwich flag.
#[derive(Debug, Clone, Default)]
pub struct NodeMeta {
    pub parent_name: Option<String>,
    pub parent_uri: Option<String>,
    /// Set when the node is simultaneously a class-definition site for its
    /// own name and a property target for its parent.
    pub is_sandwich: bool,
}

impl NodeMeta {
    pub fn owner(parent_name: &str, parent_uri: &str) -> Self {
        Self {
            parent_name: Some(parent_name.to_string()),
            parent_uri: Some(parent_uri.to_string()),
            is_sandwich: false,
        }
    }

    fn merge(&mut self, other: NodeMeta) {
        if other.parent_name.is_some() {
            self.parent_name = other.parent_name;
        }
        if other.parent_uri.is_some() {
            self.parent_uri = other.parent_uri;
        }
        self.is_sandwich |= other.is_sandwich;
    }
}

/// One occurrence of a referenced element, with the owner discovered at the
/// reference site.
#[derive(Debug, Clone)]
pub struct ReferenceSite {
    pub node: NodeId,
    pub parent_name: Option<String>,
    pub parent_uri: String,
}

/// Enclosing complex type recorded for a choice-group option.
#[derive(Debug, Clone)]
pub struct ChoiceParent {
    pub parent_name: String,
    pub parent_uri: String,
}

/// Cross-rule property registration.
#[derive(Debug, Clone)]
pub struct RegisteredProperty {
    pub uri: String,
    /// `Some(true)` datatype, `Some(false)` object, `None` undecided.
    pub is_datatype: Option<bool>,
}

/// Entity counts over the produced graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub classes: usize,
    pub datatype_properties: usize,
    pub object_properties: usize,
    pub concept_schemes: usize,
    pub concepts: usize,
    pub total_triples: usize,
}

// ============================================================================
// Context
// ============================================================================

pub struct Context {
    pub store: TripleStore,
    pub uris: UriRegistry,
    pub special: SpecialCases,
    processed: HashMap<NodeId, HashSet<&'static str>>,
    metadata: HashMap<NodeId, NodeMeta>,
    /// property IRI → every candidate domain class seen anywhere in the tree.
    pub domain_candidates: BTreeMap<String, BTreeSet<String>>,
    /// referenced element name → every site where the reference occurs.
    pub reference_contexts: BTreeMap<String, Vec<ReferenceSite>>,
    /// property name (raw and normalized) → enclosing choice parent.
    pub choice_refs: BTreeMap<String, ChoiceParent>,
    properties: HashMap<String, RegisteredProperty>,
}

impl Context {
    pub fn new(base_uri: &str, encoding: NameEncoding, special: SpecialCases) -> Self {
        Self {
            store: TripleStore::new(),
            uris: UriRegistry::new(base_uri, encoding),
            special,
            processed: HashMap::new(),
            metadata: HashMap::new(),
            domain_candidates: BTreeMap::new(),
            reference_contexts: BTreeMap::new(),
            choice_refs: BTreeMap::new(),
            properties: HashMap::new(),
        }
    }

    pub fn into_store(self) -> TripleStore {
        self.store
    }

    // ------------------------------------------------------------------
    // Processed ledger
    // ------------------------------------------------------------------

    pub fn is_processed(&self, node: NodeId, rule_id: &str) -> bool {
        self.processed
            .get(&node)
            .map(|rules| rules.contains(rule_id))
            .unwrap_or(false)
    }

    pub fn mark_processed(&mut self, node: NodeId, rule_id: &'static str) {
        self.processed.entry(node).or_default().insert(rule_id);
    }

    // ------------------------------------------------------------------
    // Node metadata
    // ------------------------------------------------------------------

    pub fn metadata(&self, node: NodeId) -> Option<&NodeMeta> {
        self.metadata.get(&node)
    }

    pub fn merge_metadata(&mut self, node: NodeId, meta: NodeMeta) {
        self.metadata.entry(node).or_default().merge(meta);
    }

    // ------------------------------------------------------------------
    // Property registry
    // ------------------------------------------------------------------

    pub fn register_property(&mut self, name: &str, uri: &str, is_datatype: Option<bool>) {
        let normalized = lower_case_initial(name);
        self.properties.insert(
            normalized,
            RegisteredProperty {
                uri: uri.to_string(),
                is_datatype,
            },
        );
    }

    pub fn registered_property(&self, name: &str) -> Option<&RegisteredProperty> {
        self.properties.get(&lower_case_initial(name))
    }

    /// Whether an IRI is already typed as a property in the graph.
    pub fn property_asserted(&self, uri: &str) -> bool {
        let subject = Term::iri(uri);
        self.store.contains(
            &subject,
            vocab::RDF_TYPE,
            &Term::iri(vocab::OWL_DATATYPE_PROPERTY),
        ) || self.store.contains(
            &subject,
            vocab::RDF_TYPE,
            &Term::iri(vocab::OWL_OBJECT_PROPERTY),
        )
    }

    // ------------------------------------------------------------------
    // Accumulators
    // ------------------------------------------------------------------

    pub fn record_domain_candidate(&mut self, property_uri: &str, class_uri: &str) {
        self.domain_candidates
            .entry(property_uri.to_string())
            .or_default()
            .insert(class_uri.to_string());
    }

    pub fn record_reference_site(&mut self, ref_name: &str, site: ReferenceSite) {
        self.reference_contexts
            .entry(ref_name.to_string())
            .or_default()
            .push(site);
    }

    /// Record a choice-group owner under both the raw and the normalized
    /// property spelling, so the domain fixer can find it either way.
    pub fn record_choice_parent(&mut self, name: &str, parent: ChoiceParent) {
        self.choice_refs
            .insert(lower_case_initial(name), parent.clone());
        self.choice_refs.insert(name.to_string(), parent);
    }

    // ------------------------------------------------------------------
    // Graph writers
    // ------------------------------------------------------------------

    /// Resolve a `type` attribute to a term: built-in datatypes through the
    /// fixed literal table, everything else as a class reference.
    pub fn type_reference(&mut self, type_name: &str) -> Term {
        if let Some((prefix, local)) = type_name.split_once(':') {
            if matches!(prefix, "xs" | "xsd") {
                let iri = vocab::xsd_datatype(local)
                    .unwrap_or_else(|| format!("{}{}", vocab::XSD_NS, local));
                return Term::iri(iri);
            }
        }
        Term::iri(self.uris.class_uri(type_name))
    }

    /// Class IRI for `name`, asserting typing and label if the class is not
    /// yet in the graph.
    pub fn ensure_class(&mut self, name: &str) -> String {
        let uri = self.uris.class_uri(name);
        let subject = Term::iri(&uri);
        if !self
            .store
            .contains(&subject, vocab::RDF_TYPE, &Term::iri(vocab::OWL_CLASS))
        {
            tracing::debug!(%name, "creating class on demand as a property domain");
            self.store
                .insert(subject.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_CLASS));
            self.store
                .insert(subject, vocab::RDFS_LABEL, Term::literal(name));
        }
        uri
    }

    pub fn add_label(&mut self, uri: &str, label: &str) {
        self.store
            .insert(Term::iri(uri), vocab::RDFS_LABEL, Term::literal(label));
    }

    pub fn add_definition(&mut self, uri: &str, text: &str) {
        self.store.insert(
            Term::iri(uri),
            vocab::SKOS_DEFINITION,
            Term::literal_lang(text, "en"),
        );
    }

    pub fn add_comment(&mut self, uri: &str, text: &str) {
        self.store
            .insert(Term::iri(uri), vocab::RDFS_COMMENT, Term::literal(text));
    }

    pub fn mark_functional(&mut self, uri: &str) {
        self.store.insert(
            Term::iri(uri),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_FUNCTIONAL_PROPERTY),
        );
    }

    pub fn statistics(&self) -> Statistics {
        let count_type = |type_iri: &str| {
            self.store
                .subjects_with(vocab::RDF_TYPE, &Term::iri(type_iri))
                .len()
        };
        Statistics {
            classes: count_type(vocab::OWL_CLASS),
            datatype_properties: count_type(vocab::OWL_DATATYPE_PROPERTY),
            object_properties: count_type(vocab::OWL_OBJECT_PROPERTY),
            concept_schemes: count_type(vocab::SKOS_CONCEPT_SCHEME),
            concepts: count_type(vocab::SKOS_CONCEPT),
            total_triples: self.store.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new(
            "http://example.org/onto#",
            NameEncoding::Underscore,
            SpecialCases::default(),
        )
    }

    #[test]
    fn ledger_is_per_rule() {
        let mut ctx = ctx();
        let node = NodeId::new(3);
        assert!(!ctx.is_processed(node, "named_complex_type"));
        ctx.mark_processed(node, "named_complex_type");
        assert!(ctx.is_processed(node, "named_complex_type"));
        assert!(!ctx.is_processed(node, "detect_simple_type"));
    }

    #[test]
    fn metadata_merge_fills_absent_fields() {
        let mut ctx = ctx();
        let node = NodeId::new(7);
        ctx.merge_metadata(node, NodeMeta::owner("Wagon", "http://example.org/onto#Wagon"));
        ctx.merge_metadata(
            node,
            NodeMeta {
                is_sandwich: true,
                ..NodeMeta::default()
            },
        );
        let meta = ctx.metadata(node).expect("meta");
        assert_eq!(meta.parent_name.as_deref(), Some("Wagon"));
        assert!(meta.is_sandwich);
    }

    #[test]
    fn type_reference_resolves_builtins_and_classes() {
        let mut ctx = ctx();
        assert_eq!(
            ctx.type_reference("xs:string"),
            Term::iri(vocab::XSD_STRING)
        );
        assert_eq!(
            ctx.type_reference("WagonType"),
            Term::iri("http://example.org/onto#WagonType")
        );
    }

    #[test]
    fn ensure_class_is_idempotent() {
        let mut ctx = ctx();
        let a = ctx.ensure_class("Wagon");
        let before = ctx.store.len();
        let b = ctx.ensure_class("Wagon");
        assert_eq!(a, b);
        assert_eq!(ctx.store.len(), before);
    }
}
