//! Class Creation phase rules.

use ontograph_rdf::{vocab, Term};
use ontograph_xsd::{NodeId, NodeKind, SchemaTree};

use crate::context::{Context, NodeMeta};
use crate::engine::TransformRule;
use crate::rules::{class_asserted, simple_range};

/// Pre-claims named declarations that are lexically types but semantically
/// simple (an explicit simple type, or a complex declaration with simple
/// content or a direct restriction) so the class-creation rules never see
/// them. Creates nothing itself.
pub struct DetectSimpleTypeRule;

impl TransformRule for DetectSimpleTypeRule {
    fn rule_id(&self) -> &'static str {
        "detect_simple_type"
    }

    fn priority(&self) -> i32 {
        300
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        let Some(name) = data.name.as_deref() else {
            return false;
        };
        if ctx.special.forced_class_type(name) {
            return false;
        }
        match data.kind {
            NodeKind::SimpleType => true,
            NodeKind::ComplexType => {
                tree.find_child(node, NodeKind::SimpleContent).is_some()
                    || tree.find_child(node, NodeKind::Restriction).is_some()
            }
            _ => false,
        }
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        tracing::debug!(
            name = tree.node(node).name.as_deref().unwrap_or(""),
            "simple type detected, blocking class creation"
        );
        ctx.mark_processed(node, "named_complex_type");
        ctx.mark_processed(node, "named_simple_type");
        ctx.mark_processed(node, self.rule_id());
        None
    }
}

/// Elements named in the injected force-class table get a class up front,
/// before property rules claim them as targets.
pub struct ForcedClassElementRule;

impl TransformRule for ForcedClassElementRule {
    fn rule_id(&self) -> &'static str {
        "forced_class_element"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element {
            return false;
        }
        let Some(name) = data.name.as_deref().or(data.ref_name.as_deref()) else {
            return false;
        };
        ctx.special.forced_class_element(name) && !class_asserted(ctx, &ctx.uris.peek_class_uri(name))
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let data = tree.node(node);
        let name = data.name.clone().or_else(|| data.ref_name.clone())?;
        let uri = ctx.uris.class_uri(&name);
        ctx.store.insert(
            Term::iri(&uri),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_CLASS),
        );
        ctx.add_label(&uri, &name);
        match tree.documentation(node) {
            Some(doc) => ctx.add_definition(&uri, &doc),
            None => ctx.add_comment(&uri, &format!("Class for {name}")),
        }
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

/// Named complex type → class with label and optional documentation.
pub struct NamedComplexTypeRule;

impl TransformRule for NamedComplexTypeRule {
    fn rule_id(&self) -> &'static str {
        "named_complex_type"
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::ComplexType {
            return false;
        }
        let Some(name) = data.name.as_deref() else {
            return false;
        };
        // Numeric custom types resolve to decimal properties, never classes.
        if ctx.special.decimal_typed(name) {
            return false;
        }
        !class_asserted(ctx, &ctx.uris.peek_class_uri(name))
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let name = tree.node(node).name.clone()?;
        let uri = ctx.uris.class_uri(&name);
        ctx.store.insert(
            Term::iri(&uri),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_CLASS),
        );
        ctx.add_label(&uri, &name);
        if let Some(doc) = tree.documentation(node) {
            ctx.add_definition(&uri, &doc);
        }
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

/// Top-level named+typed element: an enrichment source when a same-named
/// property already exists, a datatype property when its type is concrete,
/// otherwise an ordinary class.
pub struct TopLevelNamedElementRule;

impl TransformRule for TopLevelNamedElementRule {
    fn rule_id(&self) -> &'static str {
        "top_level_named_element"
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        data.kind == NodeKind::Element
            && data.name.is_some()
            && data.type_ref.is_some()
            && tree.is_top_level(node)
            && !class_asserted(
                ctx,
                &ctx.uris.peek_class_uri(data.name.as_deref().unwrap_or_default()),
            )
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let data = tree.node(node);
        let name = data.name.clone()?;
        let type_name = data.type_ref.clone()?;

        // An already-registered property under this name only gets its
        // missing documentation filled in.
        if let Some(reg) = ctx.registered_property(&name) {
            let uri = reg.uri.clone();
            let has_definition = !ctx
                .store
                .matching(Some(&Term::iri(&uri)), Some(vocab::SKOS_DEFINITION), None)
                .is_empty();
            if !has_definition {
                if let Some(doc) = tree.documentation(node) {
                    ctx.add_definition(&uri, &doc);
                }
            }
            ctx.mark_processed(node, self.rule_id());
            return Some(Term::iri(uri));
        }

        let concrete = type_name.contains(':') || ctx.special.decimal_typed(&type_name);
        if concrete || ctx.special.forced_datatype(&name).is_some() {
            let uri = ctx.uris.property_uri(&name);
            ctx.store.insert(
                Term::iri(&uri),
                vocab::RDF_TYPE,
                Term::iri(vocab::OWL_DATATYPE_PROPERTY),
            );
            ctx.add_label(&uri, &crate::uri::lower_case_initial(&name));
            let range = simple_range(tree, node, ctx);
            ctx.store.insert(Term::iri(&uri), vocab::RDFS_RANGE, range);
            if let Some(doc) = tree.documentation(node) {
                ctx.add_definition(&uri, &doc);
            }
            ctx.register_property(&name, &uri, Some(true));
            ctx.mark_processed(node, self.rule_id());
            tracing::debug!(%name, "top-level element became a datatype property");
            return Some(Term::iri(uri));
        }

        let uri = ctx.uris.class_uri(&name);
        ctx.store.insert(
            Term::iri(&uri),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_CLASS),
        );
        ctx.add_label(&uri, &name);
        if let Some(doc) = tree.documentation(node) {
            ctx.add_definition(&uri, &doc);
        }
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

/// Element with an inline complex type (no `type` attribute): a class under
/// the element's own name. Children of the type's sequence get owner
/// metadata for the Property phase; children that are themselves class sites
/// additionally get the sandwich flag.
pub struct AnonymousComplexTypeRule;

impl TransformRule for AnonymousComplexTypeRule {
    fn rule_id(&self) -> &'static str {
        "anonymous_complex_type"
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        let data = tree.node(node);
        data.kind == NodeKind::Element
            && data.name.is_some()
            && data.type_ref.is_none()
            && tree.find_child(node, NodeKind::ComplexType).is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let name = tree.node(node).name.clone()?;
        let class_uri = ctx.uris.class_uri(&name);
        ctx.store.insert(
            Term::iri(&class_uri),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_CLASS),
        );
        ctx.add_label(&class_uri, &name);

        if let Some(complex) = tree.find_child(node, NodeKind::ComplexType) {
            self.mark_children(tree, complex, &name, &class_uri, ctx);
        }

        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(class_uri))
    }
}

impl AnonymousComplexTypeRule {
    fn mark_children(
        &self,
        tree: &SchemaTree,
        complex: NodeId,
        parent_name: &str,
        parent_uri: &str,
        ctx: &mut Context,
    ) {
        let sequence = tree
            .find_child(complex, NodeKind::Sequence)
            .or_else(|| tree.find_descendant(complex, NodeKind::Sequence));
        let Some(sequence) = sequence else {
            tracing::debug!(parent = parent_name, "anonymous complex type has no sequence");
            return;
        };

        let mut marked = 0usize;
        for child in tree.children(sequence).collect::<Vec<_>>() {
            let data = tree.node(child);
            if data.kind != NodeKind::Element {
                continue;
            }
            ctx.merge_metadata(child, NodeMeta::owner(parent_name, parent_uri));
            marked += 1;

            // A child carrying its own complex content is both a property
            // target for this class and a class site for its own name.
            let own_complex_type = data
                .type_ref
                .as_deref()
                .map(|t| !t.to_lowercase().contains("simple") && !t.contains(':'))
                .unwrap_or(false)
                || tree.find_child(child, NodeKind::ComplexType).is_some();
            if own_complex_type {
                ctx.merge_metadata(
                    child,
                    NodeMeta {
                        is_sandwich: true,
                        ..NodeMeta::default()
                    },
                );
            }
        }
        tracing::debug!(parent = parent_name, children = marked, "marked sequence children");
    }
}
