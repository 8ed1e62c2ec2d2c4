//! Shared rule machinery: domain assignment, range resolution, element
//! classification and annotation folding.

use ontograph_rdf::{vocab, Term};
use ontograph_xsd::{NodeId, NodeKind, SchemaTree};

use crate::context::Context;
use crate::uri::lower_case_initial;

/// How an element declaration resolves for property-typing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementCategory {
    /// Built-in/numeric type, or inline simple type: a datatype property.
    Simple,
    /// Inline complex content: an object property (and a class site).
    Complex,
    /// A bare reference to a named custom type.
    Reference,
}

/// Classify an element the way the reference-resolution path does.
pub(crate) fn element_category(tree: &SchemaTree, node: NodeId, ctx: &Context) -> ElementCategory {
    if tree.find_descendant(node, NodeKind::ComplexType).is_some() {
        return ElementCategory::Complex;
    }
    let data = tree.node(node);
    let type_ref = data.type_ref.as_deref();
    let builtin = type_ref.map(|t| t.contains(':')).unwrap_or(false);
    let numeric = type_ref.map(|t| ctx.special.decimal_typed(t)).unwrap_or(false);
    let named_simple = type_ref
        .map(|t| simple_type_decl(tree, t).is_some())
        .unwrap_or(false);
    if tree.find_descendant(node, NodeKind::SimpleType).is_some() || builtin || numeric || named_simple
    {
        return ElementCategory::Simple;
    }
    if type_ref.is_some() {
        return ElementCategory::Reference;
    }
    ElementCategory::Complex
}

/// The schema-defined declaration a type name resolves to, when that
/// declaration is semantically simple: an explicit simple type, or a complex
/// one with simple content or a direct restriction.
pub(crate) fn simple_type_decl(tree: &SchemaTree, type_name: &str) -> Option<NodeId> {
    let decl = tree.find_type_decl(type_name)?;
    match tree.node(decl).kind {
        NodeKind::SimpleType => Some(decl),
        NodeKind::ComplexType
            if tree.find_child(decl, NodeKind::SimpleContent).is_some()
                || tree.find_child(decl, NodeKind::Restriction).is_some() =>
        {
            Some(decl)
        }
        _ => None,
    }
}

/// Literal range of a restriction's base type, defaulting to string.
pub(crate) fn restriction_base_range(
    tree: &SchemaTree,
    simple_type: NodeId,
    ctx: &mut Context,
) -> Term {
    if let Some(restriction) = tree.find_descendant(simple_type, NodeKind::Restriction) {
        if let Some(base) = tree.node(restriction).base.clone() {
            if base.contains(':') {
                return ctx.type_reference(&base);
            }
            return Term::iri(ctx.uris.class_uri(&base));
        }
    }
    Term::iri(vocab::XSD_STRING)
}

/// Range for an element whose declaration is simple: explicit type attribute
/// (built-in / numeric / custom), else inline restriction base, else string.
pub(crate) fn simple_range(tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Term {
    let data = tree.node(node);
    if let Some(type_name) = data.type_ref.clone() {
        if type_name.contains(':') {
            return ctx.type_reference(&type_name);
        }
        if ctx.special.decimal_typed(&type_name) {
            return Term::iri(vocab::XSD_DECIMAL);
        }
        if let Some(decl) = simple_type_decl(tree, &type_name) {
            return restriction_base_range(tree, decl, ctx);
        }
        return Term::iri(ctx.uris.class_uri(&type_name));
    }
    if let Some(simple_type) = tree.find_descendant(node, NodeKind::SimpleType) {
        return restriction_base_range(tree, simple_type, ctx);
    }
    Term::iri(vocab::XSD_STRING)
}

/// Datatype-vs-object decision for metadata-marked children.
pub(crate) fn is_datatype_decision(
    tree: &SchemaTree,
    node: NodeId,
    property_name: &str,
    ctx: &Context,
) -> bool {
    let data = tree.node(node);
    let name = data.name.as_deref().unwrap_or(property_name);
    let type_ref = data.type_ref.as_deref();

    if ctx.special.forced_datatype(name).is_some() || ctx.special.never_object(Some(name), type_ref)
    {
        return true;
    }
    if let Some(type_name) = type_ref {
        if ctx.special.decimal_typed(type_name) {
            return true;
        }
    }
    if tree.find_child(node, NodeKind::ComplexType).is_some() {
        return false;
    }
    if let Some(type_name) = type_ref {
        if !type_name.to_lowercase().contains("simple") {
            return false;
        }
    }
    true
}

const DATE_TIME_HINTS: &[&str] = &["date", "time", "expiry", "until", "since"];

/// Range for a datatype property decided heuristically: numeric pattern,
/// explicit built-in, a date/time-flavored name, then string.
pub(crate) fn heuristic_datatype_range(
    tree: &SchemaTree,
    node: NodeId,
    property_name: &str,
    ctx: &mut Context,
) -> Term {
    let type_ref = tree.node(node).type_ref.clone();
    if let Some(type_name) = &type_ref {
        if ctx.special.decimal_typed(type_name) {
            return Term::iri(vocab::XSD_DECIMAL);
        }
        if type_name.contains(':') {
            return ctx.type_reference(type_name);
        }
    }
    let lower = property_name.to_lowercase();
    if DATE_TIME_HINTS.iter().any(|hint| lower.contains(hint)) {
        return Term::iri(vocab::XSD_DATE_TIME);
    }
    Term::iri(vocab::XSD_STRING)
}

/// Walk parent links to the class that owns a property site: a named complex
/// type, a named element with inline complex content, or (through a choice
/// group) the element enclosing the choice. Falls back to the nearest named
/// element ancestor. The owning class is created on demand.
pub(crate) fn find_parent_owner(tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<String> {
    let mut last_named_element: Option<String> = None;
    let mut current = node;
    loop {
        let Some(parent) = tree.parent(current) else {
            return last_named_element.map(|name| ctx.ensure_class(&name));
        };
        let data = tree.node(parent);
        match data.kind {
            NodeKind::ComplexType => {
                if let Some(name) = data.name.clone() {
                    return Some(ctx.ensure_class(&name));
                }
            }
            NodeKind::Element => {
                if let Some(name) = data.name.clone() {
                    if tree.find_child(parent, NodeKind::ComplexType).is_some() {
                        return Some(ctx.ensure_class(&name));
                    }
                    last_named_element = Some(name);
                }
            }
            NodeKind::Choice => {
                // choice → complexType → named element chain.
                if let Some(owner) = choice_owner(tree, parent) {
                    return Some(ctx.ensure_class(&owner));
                }
            }
            _ => {}
        }
        current = parent;
    }
}

/// Name of the element enclosing a choice group, when the chain is the usual
/// `element > complexType > choice` shape.
pub(crate) fn choice_owner(tree: &SchemaTree, choice: NodeId) -> Option<String> {
    let complex = tree.parent(choice)?;
    if tree.node(complex).kind != NodeKind::ComplexType {
        return None;
    }
    let element = tree.parent(complex)?;
    let data = tree.node(element);
    if data.kind == NodeKind::Element {
        return data.name.clone();
    }
    // A named complex type encloses the choice directly.
    tree.node(complex).name.clone()
}

/// Set the domain for a property at a given site: metadata owner first, else
/// the parent-link walk. The discovered owner is always recorded in the
/// domain accumulator in addition to the direct assertion, so the domain
/// fixer can later union multiple owners.
pub(crate) fn set_property_domain(
    tree: &SchemaTree,
    node: NodeId,
    property_uri: &str,
    ctx: &mut Context,
) -> bool {
    let from_meta = ctx.metadata(node).and_then(|m| m.parent_uri.clone());
    let owner = match from_meta {
        Some(uri) => Some(uri),
        None => find_parent_owner(tree, node, ctx),
    };
    match owner {
        Some(parent_uri) => {
            ctx.record_domain_candidate(property_uri, &parent_uri);
            let subject = Term::iri(property_uri);
            let object = Term::iri(&parent_uri);
            if !ctx.store.contains(&subject, vocab::RDFS_DOMAIN, &object) {
                ctx.store.insert(subject, vocab::RDFS_DOMAIN, object);
            }
            true
        }
        None => false,
    }
}

/// Concatenate every documentation string found under the given nodes,
/// normalizing internal whitespace. Empty results collapse to `None`.
pub(crate) fn consolidated_annotation(tree: &SchemaTree, nodes: &[NodeId]) -> Option<String> {
    let mut parts = Vec::new();
    for node in nodes {
        parts.extend(tree.all_documentation(*node));
    }
    let joined = parts.join(" ");
    let normalized = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Shared datatype-property assembly: typing, label, domain, range,
/// functional flag and documentation.
pub(crate) fn assert_datatype_property(
    tree: &SchemaTree,
    node: NodeId,
    property_uri: &str,
    label: &str,
    range: Term,
    ctx: &mut Context,
) {
    let subject = Term::iri(property_uri);
    ctx.store.insert(
        subject.clone(),
        vocab::RDF_TYPE,
        Term::iri(vocab::OWL_DATATYPE_PROPERTY),
    );
    ctx.add_label(property_uri, &lower_case_initial(label));
    set_property_domain(tree, node, property_uri, ctx);
    ctx.store.insert(subject, vocab::RDFS_RANGE, range);
    if tree.is_functional(node) {
        ctx.mark_functional(property_uri);
    }
    if let Some(doc) = tree.documentation(node) {
        ctx.add_definition(property_uri, &doc);
    }
}

/// Shared object-property assembly, mirroring `assert_datatype_property`.
pub(crate) fn assert_object_property(
    tree: &SchemaTree,
    node: NodeId,
    property_uri: &str,
    label: &str,
    range: Term,
    ctx: &mut Context,
) {
    let subject = Term::iri(property_uri);
    ctx.store.insert(
        subject.clone(),
        vocab::RDF_TYPE,
        Term::iri(vocab::OWL_OBJECT_PROPERTY),
    );
    ctx.add_label(property_uri, &lower_case_initial(label));
    set_property_domain(tree, node, property_uri, ctx);
    ctx.store.insert(subject, vocab::RDFS_RANGE, range);
    if tree.is_functional(node) {
        ctx.mark_functional(property_uri);
    }
    if let Some(doc) = tree.documentation(node) {
        ctx.add_definition(property_uri, &doc);
    }
}

/// Whether the graph already types this IRI as a class.
pub(crate) fn class_asserted(ctx: &Context, uri: &str) -> bool {
    ctx.store.contains(
        &Term::iri(uri),
        vocab::RDF_TYPE,
        &Term::iri(vocab::OWL_CLASS),
    )
}

/// Existence guard used by property rules: true when a property under this
/// element name is already registered or asserted in the graph.
pub(crate) fn property_exists_for(ctx: &Context, name: &str) -> bool {
    if let Some(reg) = ctx.registered_property(name) {
        if ctx.property_asserted(&reg.uri) {
            return true;
        }
    }
    ctx.property_asserted(&ctx.uris.peek_property_uri(name))
}
