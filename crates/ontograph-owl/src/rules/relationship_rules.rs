//! Relationship phase rules: sandwich-element properties and reference-site
//! tracking for the cleanup fixers.

use ontograph_rdf::Term;
use ontograph_xsd::{NodeId, NodeKind, SchemaTree};

use crate::context::{Context, ReferenceSite};
use crate::engine::TransformRule;
use crate::rules::assert_object_property;
use crate::uri::lower_case_initial;

/// Records every `ref` occurrence that carries owner metadata, so the
/// cleanup phase can replay multi-site references into extra domains.
pub struct ReferenceTrackingRule;

impl TransformRule for ReferenceTrackingRule {
    fn rule_id(&self) -> &'static str {
        "reference_tracking"
    }

    fn priority(&self) -> i32 {
        500
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        let data = tree.node(node);
        data.kind == NodeKind::Element && data.ref_name.is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let ref_name = tree.node(node).ref_name.clone()?;
        let meta = ctx.metadata(node).cloned();
        if let Some(meta) = meta {
            if let Some(parent_uri) = meta.parent_uri {
                tracing::debug!(
                    %ref_name,
                    parent = meta.parent_name.as_deref().unwrap_or(""),
                    "tracked reference site"
                );
                ctx.record_reference_site(
                    &ref_name,
                    ReferenceSite {
                        node,
                        parent_name: meta.parent_name,
                        parent_uri,
                    },
                );
            }
        }
        ctx.mark_processed(node, self.rule_id());
        None
    }
}

/// Sandwich elements (already classes of their own, flagged during class
/// creation) additionally become object properties of their parent.
pub struct SandwichElementPropertyRule;

impl TransformRule for SandwichElementPropertyRule {
    fn rule_id(&self) -> &'static str {
        "sandwich_element_property"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        tree.node(node).kind == NodeKind::Element
            && ctx.metadata(node).map(|m| m.is_sandwich).unwrap_or(false)
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let data = tree.node(node);
        let name = data.name.clone().or_else(|| data.ref_name.clone())?;
        let property_name = lower_case_initial(&name);

        let target_uri = ctx.uris.class_uri(&name);
        let property_uri = ctx.uris.property_uri(&property_name);
        assert_object_property(tree, node, &property_uri, &name, Term::iri(target_uri), ctx);
        ctx.register_property(&property_name, &property_uri, Some(false));
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(property_uri))
    }
}
