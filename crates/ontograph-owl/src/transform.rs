//! Transformer front door: one context per run, the standard pipeline, the
//! populated triple store out.

use ontograph_rdf::TripleStore;
use ontograph_xsd::{parse_schema, ParseError, SchemaTree};

use crate::context::Context;
use crate::engine::Pipeline;
use crate::special::SpecialCases;
use crate::uri::NameEncoding;

#[derive(Debug, Clone, Default)]
pub struct Transformer {
    encoding: NameEncoding,
    special: SpecialCases,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: NameEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_special_cases(mut self, special: SpecialCases) -> Self {
        self.special = special;
        self
    }

    /// Run the five-phase pipeline over a parsed schema tree. Every run gets
    /// a fresh context; repeated runs over the same input produce identical
    /// triple sets.
    pub fn transform(&self, tree: &SchemaTree, base_uri: &str) -> TripleStore {
        let mut ctx = Context::new(base_uri, self.encoding, self.special.clone());
        Pipeline::standard().execute(tree, &mut ctx);
        let stats = ctx.statistics();
        tracing::info!(
            classes = stats.classes,
            datatype_properties = stats.datatype_properties,
            object_properties = stats.object_properties,
            concept_schemes = stats.concept_schemes,
            concepts = stats.concepts,
            total = stats.total_triples,
            "transformation complete"
        );
        ctx.into_store()
    }

    /// Convenience: parse XSD text, then transform.
    pub fn transform_str(&self, xsd: &str, base_uri: &str) -> Result<TripleStore, ParseError> {
        let tree = parse_schema(xsd)?;
        Ok(self.transform(&tree, base_uri))
    }
}
