//! XSD → OWL/SKOS transformation core.
//!
//! A small compiler over the schema tree: five ordered phases walk the whole
//! tree, each applying the highest-priority matching rule per node. Rules
//! communicate through the transformation context (processed ledger, node
//! metadata, domain accumulator) rather than a shared call stack, and the
//! Cleanup phase repairs whatever earlier phases left inconsistent
//! (union domains, conflicting property typings, duplicate ranges).
//!
//! Entry point: [`Transformer::transform`]. The produced triple store is the
//! whole artifact; serialization lives in `ontograph-rdf`.

pub mod context;
pub mod engine;
pub mod lookup;
pub mod rules;
pub mod special;
pub mod transform;
pub mod uri;

pub use context::{Context, NodeMeta, Statistics};
pub use engine::{Phase, Pipeline, TransformRule};
pub use lookup::OntologyIndex;
pub use special::SpecialCases;
pub use transform::Transformer;
pub use uri::{NameEncoding, UriRegistry};
