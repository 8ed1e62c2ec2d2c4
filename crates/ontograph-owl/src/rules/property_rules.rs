//! Property Creation phase rules.
//!
//! Decision order per element, highest priority first: top-level simple
//! elements, numeric custom types (with remove-then-reassert recovery),
//! choice-group expansion, element references, built-in simple types,
//! inline simple types, sandwich-adjacent complex elements, metadata-marked
//! children, and finally references to named complex types.

use ontograph_rdf::{vocab, Term};
use ontograph_xsd::{NodeId, NodeKind, SchemaTree};

use crate::context::{ChoiceParent, Context};
use crate::engine::TransformRule;
use crate::rules::{
    assert_datatype_property, assert_object_property, choice_owner, consolidated_annotation,
    element_category, heuristic_datatype_range, is_datatype_decision, property_exists_for,
    restriction_base_range, set_property_domain, simple_range, simple_type_decl, ElementCategory,
};
use crate::uri::lower_case_initial;

/// Top-level element with a simple declaration (inline simple type, built-in
/// or numeric type) → datatype property without a domain.
pub struct TopLevelSimpleElementRule;

impl TransformRule for TopLevelSimpleElementRule {
    fn rule_id(&self) -> &'static str {
        "top_level_simple_element"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element || data.name.is_none() || !tree.is_top_level(node) {
            return false;
        }
        let name = data.name.as_deref().unwrap_or_default();
        if property_exists_for(ctx, name) {
            return false;
        }
        let has_simple = tree.find_descendant(node, NodeKind::SimpleType).is_some();
        let builtin = data.type_ref.as_deref().map(|t| t.contains(':')).unwrap_or(false);
        let numeric = data
            .type_ref
            .as_deref()
            .map(|t| ctx.special.decimal_typed(t))
            .unwrap_or(false);
        let has_complex = tree.find_descendant(node, NodeKind::ComplexType).is_some();
        (has_simple || builtin || numeric) && !has_complex
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let name = tree.node(node).name.clone()?;
        let uri = ctx.uris.property_uri(&name);
        let subject = Term::iri(&uri);
        ctx.store.insert(
            subject.clone(),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_DATATYPE_PROPERTY),
        );
        ctx.add_label(&uri, &lower_case_initial(&name));
        let range = simple_range(tree, node, ctx);
        ctx.store.insert(subject, vocab::RDFS_RANGE, range);
        if tree.is_functional(node) {
            ctx.mark_functional(&uri);
        }
        if let Some(annotation) = consolidated_annotation(tree, &[node]) {
            ctx.add_definition(&uri, &annotation);
        }
        ctx.register_property(&name, &uri, Some(true));
        ctx.mark_processed(node, self.rule_id());
        // Keep the class-creation path away from this element as well.
        ctx.mark_processed(node, "top_level_named_element");
        Some(Term::iri(uri))
    }
}

/// Numeric custom type (`Numeric<digits>[-<digits>]` or a forced-datatype
/// name) → decimal datatype property. Any earlier conflicting assertion is
/// wiped before the fresh triples go in, and every rule that could re-claim
/// the element, or turn the numeric type itself into a class, is marked
/// off defensively.
pub struct NumericTypePropertyRule;

impl TransformRule for NumericTypePropertyRule {
    fn rule_id(&self) -> &'static str {
        "numeric_type_property"
    }

    fn priority(&self) -> i32 {
        150
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element || data.name.is_none() {
            return false;
        }
        let name = data.name.as_deref();
        let Some(type_name) = data.type_ref.as_deref() else {
            return false;
        };
        ctx.special.decimal_typed(type_name) || ctx.special.never_object(name, Some(type_name))
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let data = tree.node(node);
        let name = data.name.clone()?;
        let type_name = data.type_ref.clone()?;

        let uri = ctx.uris.property_uri(&name);
        let subject = Term::iri(&uri);

        // Recovery from any earlier conflicting assertion: start clean.
        let removed = ctx.store.remove_matching(Some(&subject), None, None);
        if removed > 0 {
            tracing::debug!(%name, removed, "re-asserting numeric property from scratch");
        }

        let forced_range = ctx.special.forced_datatype(&name).and_then(|f| f.range.clone());
        let range = match forced_range {
            Some(r) => ctx.type_reference(&r),
            None => Term::iri(vocab::XSD_DECIMAL),
        };

        assert_datatype_property(tree, node, &uri, &name, range, ctx);
        ctx.add_comment(&uri, &format!("Original schema type was {type_name}"));
        ctx.register_property(&name, &uri, Some(true));

        ctx.mark_processed(node, self.rule_id());
        ctx.mark_processed(node, "complex_type_reference");
        ctx.mark_processed(node, "simple_type_property");
        ctx.mark_processed(node, "inline_simple_type_property");
        ctx.mark_processed(node, "child_element_property");
        ctx.mark_processed(node, "sandwich_element_property");

        // The numeric type declaration itself must never become a class.
        if let Some(type_decl) = tree.find_type_decl(&type_name) {
            ctx.mark_processed(type_decl, "named_complex_type");
            ctx.mark_processed(type_decl, "named_simple_type");
        }

        Some(Term::iri(uri))
    }
}

/// Choice group: every option becomes its own property, domain-bound to the
/// complex type enclosing the choice. Groups with more than one option get
/// an informational exactly-one comment on every sibling; the constraint is
/// documentation, not an enforced cardinality axiom.
pub struct ChoiceElementPropertyRule;

impl TransformRule for ChoiceElementPropertyRule {
    fn rule_id(&self) -> &'static str {
        "choice_element_property"
    }

    fn priority(&self) -> i32 {
        120
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        tree.node(node).kind == NodeKind::Choice
            && tree.find_descendant(node, NodeKind::Element).is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let parent = tree.parent(node)?;
        let options = tree.descendants_of_kind(node, NodeKind::Element);
        let owner_name = choice_owner(tree, node);

        let mut minted: Vec<String> = Vec::new();
        for child in options {
            if let Some(uri) = self.transform_option(tree, parent, child, &owner_name, ctx) {
                minted.push(uri);
            }
        }

        if minted.len() > 1 {
            let comment = format!(
                "One of the {} properties in this choice group is expected to carry a value.",
                minted.len()
            );
            for uri in &minted {
                ctx.add_comment(uri, &comment);
            }
        }
        ctx.mark_processed(node, self.rule_id());
        minted.first().map(|uri| Term::iri(uri.clone()))
    }
}

impl ChoiceElementPropertyRule {
    fn transform_option(
        &self,
        tree: &SchemaTree,
        choice_parent: NodeId,
        child: NodeId,
        owner_name: &Option<String>,
        ctx: &mut Context,
    ) -> Option<String> {
        let data = tree.node(child);
        let element_name = data.name.clone().or_else(|| data.ref_name.clone())?;
        let is_ref = data.name.is_none();

        let uri = ctx.uris.property_uri(&element_name);
        let subject = Term::iri(&uri);

        // Classify the option: its own declaration, or the referenced one.
        let decl = if is_ref {
            tree.find_by_name(&element_name)
        } else {
            Some(child)
        };
        let (is_datatype, range) = match decl {
            Some(decl) => match element_category(tree, decl, ctx) {
                ElementCategory::Simple => (true, simple_range(tree, decl, ctx)),
                ElementCategory::Complex => {
                    let class_uri = ctx.ensure_class(&element_name);
                    (false, Term::iri(class_uri))
                }
                ElementCategory::Reference => {
                    let type_name = tree.node(decl).type_ref.clone()?;
                    (false, Term::iri(ctx.uris.class_uri(&type_name)))
                }
            },
            // Unresolvable reference: fall back to a plain string property.
            None => (true, Term::iri(vocab::XSD_STRING)),
        };

        let type_iri = if is_datatype {
            vocab::OWL_DATATYPE_PROPERTY
        } else {
            vocab::OWL_OBJECT_PROPERTY
        };
        ctx.store
            .insert(subject.clone(), vocab::RDF_TYPE, Term::iri(type_iri));
        ctx.add_label(&uri, &lower_case_initial(&element_name));
        set_property_domain(tree, choice_parent, &uri, ctx);
        ctx.store.insert(subject, vocab::RDFS_RANGE, range);
        if tree.is_functional(child) {
            ctx.mark_functional(&uri);
        }
        if let Some(doc) = tree.documentation(child) {
            ctx.add_definition(&uri, &doc);
        }
        ctx.register_property(&element_name, &uri, Some(is_datatype));

        // Cross-reference to the enclosing parent for the domain fixer.
        if let Some(parent_name) = owner_name {
            let parent_uri = ctx.uris.peek_class_uri(parent_name);
            ctx.record_choice_parent(
                &element_name,
                ChoiceParent {
                    parent_name: parent_name.clone(),
                    parent_uri,
                },
            );
        }

        ctx.mark_processed(child, "simple_type_property");
        ctx.mark_processed(child, "complex_type_reference");
        ctx.mark_processed(child, "inline_simple_type_property");
        ctx.mark_processed(child, "element_reference_rule");

        Some(uri)
    }
}

/// Element reference (`ref`): resolve the referenced top-level declaration,
/// classify it as simple or complex, and fold documentation from both the
/// reference site and the declaration into one definition. An unresolvable
/// reference leaves the node unclaimed for this rule.
pub struct ElementReferenceRule;

impl TransformRule for ElementReferenceRule {
    fn rule_id(&self) -> &'static str {
        "element_reference_rule"
    }

    fn priority(&self) -> i32 {
        110
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        let data = tree.node(node);
        data.kind == NodeKind::Element && data.ref_name.is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let ref_name = tree.node(node).ref_name.clone()?;
        let Some(referenced) = tree.find_by_name(&ref_name) else {
            tracing::warn!(%ref_name, "referenced element not found, skipping occurrence");
            return None;
        };

        let uri = ctx.uris.property_uri(&ref_name);
        let subject = Term::iri(&uri);
        let category = element_category(tree, referenced, ctx);

        let (type_iri, range) = if category == ElementCategory::Simple {
            (
                vocab::OWL_DATATYPE_PROPERTY,
                simple_range(tree, referenced, ctx),
            )
        } else {
            let class_uri = ctx.uris.class_uri(&ref_name);
            (vocab::OWL_OBJECT_PROPERTY, Term::iri(class_uri))
        };

        ctx.store
            .insert(subject.clone(), vocab::RDF_TYPE, Term::iri(type_iri));
        ctx.add_label(&uri, &lower_case_initial(&ref_name));
        self.assign_domain(tree, node, &ref_name, &uri, ctx);
        ctx.store.insert(subject, vocab::RDFS_RANGE, range);
        if tree.is_functional(node) {
            ctx.mark_functional(&uri);
        }
        if let Some(annotation) = consolidated_annotation(tree, &[referenced, node]) {
            ctx.add_definition(&uri, &annotation);
        }
        ctx.register_property(&ref_name, &uri, Some(category == ElementCategory::Simple));

        // A complex referenced declaration is also a class; make sure it has
        // typing and its own documentation.
        if category != ElementCategory::Simple {
            let class_uri = ctx.ensure_class(&ref_name);
            if let Some(annotation) = consolidated_annotation(tree, &[referenced]) {
                let has_definition = !ctx
                    .store
                    .matching(
                        Some(&Term::iri(&class_uri)),
                        Some(vocab::SKOS_DEFINITION),
                        None,
                    )
                    .is_empty();
                if !has_definition {
                    ctx.add_definition(&class_uri, &annotation);
                }
            }
        }

        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

impl ElementReferenceRule {
    /// Domain for a reference site. Inside a choice group the owner is the
    /// element enclosing the choice, recorded as a choice cross-reference as
    /// well; everywhere else the shared domain walk applies.
    fn assign_domain(
        &self,
        tree: &SchemaTree,
        node: NodeId,
        ref_name: &str,
        property_uri: &str,
        ctx: &mut Context,
    ) {
        let choice = tree
            .parent(node)
            .filter(|p| tree.node(*p).kind == NodeKind::Choice);
        if let Some(choice) = choice {
            if let Some(owner) = choice_owner(tree, choice) {
                let parent_uri = ctx.ensure_class(&owner);
                ctx.record_domain_candidate(property_uri, &parent_uri);
                ctx.store.insert(
                    Term::iri(property_uri),
                    vocab::RDFS_DOMAIN,
                    Term::iri(&parent_uri),
                );
                ctx.record_choice_parent(
                    ref_name,
                    ChoiceParent {
                        parent_name: owner,
                        parent_uri,
                    },
                );
                return;
            }
        }
        set_property_domain(tree, node, property_uri, ctx);
    }
}

/// Element typed by a namespace-qualified built-in, or by a schema-defined
/// simple type (including complex declarations with simple content) →
/// datatype property.
pub struct SimpleTypePropertyRule;

impl TransformRule for SimpleTypePropertyRule {
    fn rule_id(&self) -> &'static str {
        "simple_type_property"
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element || data.name.is_none() {
            return false;
        }
        let Some(type_name) = data.type_ref.as_deref() else {
            return false;
        };
        if property_exists_for(ctx, data.name.as_deref().unwrap_or_default()) {
            return false;
        }
        type_name.contains(':') || simple_type_decl(tree, type_name).is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let data = tree.node(node);
        let name = data.name.clone()?;
        let uri = ctx.uris.property_uri(&name);
        let range = simple_range(tree, node, ctx);
        assert_datatype_property(tree, node, &uri, &name, range, ctx);
        ctx.register_property(&name, &uri, Some(true));
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

/// Element with an inline simple type (no complex content) → datatype
/// property ranging over the restriction's base, or string.
pub struct InlineSimpleTypePropertyRule;

impl TransformRule for InlineSimpleTypePropertyRule {
    fn rule_id(&self) -> &'static str {
        "inline_simple_type_property"
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        data.kind == NodeKind::Element
            && data.name.is_some()
            && !property_exists_for(ctx, data.name.as_deref().unwrap_or_default())
            && tree.find_descendant(node, NodeKind::SimpleType).is_some()
            && tree.find_descendant(node, NodeKind::ComplexType).is_none()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let name = tree.node(node).name.clone()?;
        let uri = ctx.uris.property_uri(&name);
        let simple_type = tree.find_descendant(node, NodeKind::SimpleType)?;
        let range = restriction_base_range(tree, simple_type, ctx);
        assert_datatype_property(tree, node, &uri, &name, range, ctx);
        ctx.register_property(&name, &uri, Some(true));
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

/// Metadata-marked element with its own inline complex type: an object
/// property ranging over the class minted for the element's own name.
pub struct ComplexElementPropertyRule;

impl TransformRule for ComplexElementPropertyRule {
    fn rule_id(&self) -> &'static str {
        "complex_element_property"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element {
            return false;
        }
        let Some(name) = data.name.as_deref() else {
            return false;
        };
        if ctx.special.never_object(Some(name), data.type_ref.as_deref()) {
            return false;
        }
        if tree.find_child(node, NodeKind::ComplexType).is_none() {
            return false;
        }
        let has_owner = ctx
            .metadata(node)
            .map(|m| m.parent_uri.is_some())
            .unwrap_or(false);
        if !has_owner {
            return false;
        }
        match ctx.registered_property(name) {
            Some(reg) => reg.is_datatype != Some(true) && !ctx.property_asserted(&reg.uri),
            None => true,
        }
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let name = tree.node(node).name.clone()?;
        let uri = ctx.uris.property_uri(&name);
        let class_uri = ctx.uris.class_uri(&name);
        assert_object_property(tree, node, &uri, &name, Term::iri(class_uri), ctx);
        ctx.register_property(&name, &uri, Some(false));
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

/// Metadata-marked child not claimed by any earlier rule: datatype or object
/// by structural heuristics, string range as the last resort.
pub struct ChildElementPropertyRule;

impl TransformRule for ChildElementPropertyRule {
    fn rule_id(&self) -> &'static str {
        "child_element_property"
    }

    fn priority(&self) -> i32 {
        75
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element {
            return false;
        }
        let Some(name) = data.name.as_deref().or(data.ref_name.as_deref()) else {
            return false;
        };
        let has_owner = ctx
            .metadata(node)
            .map(|m| m.parent_uri.is_some())
            .unwrap_or(false);
        has_owner && ctx.registered_property(name).is_none()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let data = tree.node(node);
        let raw_name = data.name.clone().or_else(|| data.ref_name.clone())?;
        let is_ref = data.name.is_none();

        if ctx
            .special
            .never_object(Some(&raw_name), data.type_ref.as_deref())
            && tree.find_child(node, NodeKind::ComplexType).is_some()
        {
            // Forced-datatype names with complex content are left for the
            // cleanup fixer rather than asserted both ways here.
            return None;
        }

        let property_name = lower_case_initial(&raw_name);
        let uri = ctx.uris.property_uri(&property_name);
        if ctx.store.contains(
            &Term::iri(&uri),
            vocab::RDF_TYPE,
            &Term::iri(vocab::OWL_DATATYPE_PROPERTY),
        ) {
            return None;
        }

        let mut datatype = is_datatype_decision(tree, node, &property_name, ctx);
        if is_ref && !datatype {
            if let Some(referenced) = tree.find_by_name(&raw_name) {
                datatype = is_datatype_decision(tree, referenced, &property_name, ctx);
            }
        }

        if datatype {
            let range = heuristic_datatype_range(tree, node, &property_name, ctx);
            assert_datatype_property(tree, node, &uri, &raw_name, range, ctx);
            ctx.register_property(&property_name, &uri, Some(true));
        } else {
            let target = ctx.uris.class_uri(&raw_name);
            assert_object_property(tree, node, &uri, &raw_name, Term::iri(target), ctx);
            ctx.register_property(&property_name, &uri, Some(false));
        }

        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}

/// Element whose `type` names a complex type defined in the schema → object
/// property ranging over that type's class.
pub struct ComplexTypeReferenceRule;

impl TransformRule for ComplexTypeReferenceRule {
    fn rule_id(&self) -> &'static str {
        "complex_type_reference"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element || data.name.is_none() {
            return false;
        }
        // Top-level declarations are class/document roots, not property
        // sites; they have no enclosing type to domain on.
        if tree.is_top_level(node) {
            return false;
        }
        let Some(type_name) = data.type_ref.as_deref() else {
            return false;
        };
        let name = data.name.as_deref();
        if ctx.special.never_object(name, Some(type_name)) {
            return false;
        }
        if type_name.contains(':') || ctx.special.decimal_typed(type_name) {
            return false;
        }
        if property_exists_for(ctx, name.unwrap_or_default()) {
            return false;
        }
        tree.find_complex_type(type_name).is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let data = tree.node(node);
        let name = data.name.clone()?;
        let type_name = data.type_ref.clone()?;

        let uri = ctx.uris.property_uri(&name);
        if ctx.store.contains(
            &Term::iri(&uri),
            vocab::RDF_TYPE,
            &Term::iri(vocab::OWL_DATATYPE_PROPERTY),
        ) {
            tracing::debug!(%name, "already a datatype property, not re-typing as object");
            ctx.mark_processed(node, self.rule_id());
            return Some(Term::iri(uri));
        }

        let range = Term::iri(ctx.uris.class_uri(&type_name));
        assert_object_property(tree, node, &uri, &name, range, ctx);
        ctx.register_property(&name, &uri, Some(false));
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(uri))
    }
}
