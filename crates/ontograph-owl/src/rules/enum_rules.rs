//! Enumeration phase rules: concept schemes and concepts, plus the
//! best-effort definition-extraction heuristic over annotation prose.

use ontograph_rdf::{vocab, Term};
use ontograph_xsd::{NodeId, NodeKind, SchemaTree};
use regex::Regex;

use crate::context::Context;
use crate::engine::TransformRule;
use crate::rules::consolidated_annotation;

/// Named simple type with enumeration facets → concept scheme plus one
/// concept per value.
pub struct NamedEnumTypeRule;

impl TransformRule for NamedEnumTypeRule {
    fn rule_id(&self) -> &'static str {
        "named_enum_type"
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::SimpleType || data.name.is_none() {
            return false;
        }
        enum_restriction(tree, node).is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let name = tree.node(node).name.clone()?;
        let restriction = enum_restriction(tree, node)?;
        let scheme_uri = build_scheme(tree, node, restriction, &name, name.clone(), ctx);
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(scheme_uri))
    }
}

/// Element with an inline enumerated simple type → concept scheme named
/// `<ElementName>_enum`. The element independently stays a datatype
/// property; the scheme coexists with it rather than replacing its range.
pub struct AnonymousEnumTypeRule;

impl TransformRule for AnonymousEnumTypeRule {
    fn rule_id(&self) -> &'static str {
        "anonymous_enum_type"
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        let data = tree.node(node);
        if data.kind != NodeKind::Element || data.name.is_none() {
            return false;
        }
        tree.find_child(node, NodeKind::SimpleType)
            .and_then(|st| enum_restriction(tree, st))
            .is_some()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let name = tree.node(node).name.clone()?;
        let simple_type = tree.find_child(node, NodeKind::SimpleType)?;
        let restriction = enum_restriction(tree, simple_type)?;
        let scheme_name = format!("{name}_enum");
        let label = format!("Enumeration for {name}");
        let scheme_uri = build_scheme(tree, node, restriction, &scheme_name, label, ctx);
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(scheme_uri))
    }
}

/// Direct restriction child that carries at least one enumeration facet.
fn enum_restriction(tree: &SchemaTree, type_node: NodeId) -> Option<NodeId> {
    let restriction = tree.find_child(type_node, NodeKind::Restriction)?;
    tree.children(restriction)
        .any(|c| tree.node(c).kind == NodeKind::Enumeration)
        .then_some(restriction)
}

/// Create the scheme, its concepts, and whatever definitions the annotation
/// prose yields. `doc_node` is where annotation text lives (the type
/// declaration, or the element for the anonymous case).
fn build_scheme(
    tree: &SchemaTree,
    doc_node: NodeId,
    restriction: NodeId,
    scheme_name: &str,
    label: String,
    ctx: &mut Context,
) -> String {
    let scheme_uri = ctx.uris.class_uri(scheme_name);
    ctx.store.insert(
        Term::iri(&scheme_uri),
        vocab::RDF_TYPE,
        Term::iri(vocab::SKOS_CONCEPT_SCHEME),
    );
    ctx.add_label(&scheme_uri, &label);

    let annotation = consolidated_annotation(tree, &[doc_node]);
    let mut values = Vec::new();
    for facet in tree.children(restriction).collect::<Vec<_>>() {
        if tree.node(facet).kind != NodeKind::Enumeration {
            continue;
        }
        let Some(value) = tree.node(facet).value.clone() else {
            continue;
        };
        let concept_uri = ctx.uris.concept_uri(&scheme_uri, &value);
        ctx.store.insert(
            Term::iri(&concept_uri),
            vocab::RDF_TYPE,
            Term::iri(vocab::SKOS_CONCEPT),
        );
        ctx.store.insert(
            Term::iri(&concept_uri),
            vocab::SKOS_IN_SCHEME,
            Term::iri(&scheme_uri),
        );
        ctx.store.insert(
            Term::iri(&concept_uri),
            vocab::SKOS_PREF_LABEL,
            Term::literal(&value),
        );
        if let Some(doc) = tree.documentation(facet) {
            ctx.add_definition(&concept_uri, &doc);
        }
        values.push((value, concept_uri, tree.documentation(facet).is_some()));
    }

    if let Some(annotation) = annotation {
        let all_values: Vec<String> = values.iter().map(|(v, _, _)| v.clone()).collect();
        for (value, concept_uri, has_own_doc) in &values {
            if *has_own_doc {
                continue;
            }
            if let Some(definition) = extract_definition(&annotation, value, &all_values) {
                tracing::debug!(%value, %definition, "extracted concept definition");
                ctx.add_definition(concept_uri, &definition);
            }
        }
    }

    scheme_uri
}

/// Pull the definition of one enumerated value out of free-form annotation
/// prose. Tried in order: `value = text`, `value: text`, `value - text`,
/// `value text` (each capture halting at the next digit or operator), then
/// the substring between this value's occurrence and the next value's.
fn extract_definition(annotation: &str, value: &str, all_values: &[String]) -> Option<String> {
    let escaped = regex::escape(value);
    let patterns = [
        format!(r"{escaped}\s*=\s*([^=0-9]+)"),
        format!(r"{escaped}\s*:\s*([^:0-9]+)"),
        format!(r"{escaped}\s*-\s*([^\-0-9]+)"),
        format!(r"{escaped}\s+([^=:0-9][^0-9]*)"),
    ];

    for pattern in &patterns {
        let Ok(re) = Regex::new(pattern) else { continue };
        if let Some(caps) = re.captures(annotation) {
            let captured = caps.get(1).map(|m| m.as_str().trim().to_string())?;
            let cleaned = trim_trailing_values(&captured, value, all_values);
            if !cleaned.is_empty() {
                return Some(cleaned);
            }
        }
    }

    // Positional fallback: the text between this value and the next one.
    let pos = annotation.find(value)?;
    let start = pos + value.len();
    let mut end = annotation.len();
    for other in all_values {
        if other == value {
            continue;
        }
        if let Some(found) = annotation[start..].find(other.as_str()) {
            end = end.min(start + found);
        }
    }
    let raw = annotation[start..end].trim();
    let cleaned = raw
        .trim_start_matches(['=', ':', ',', '-', ' '])
        .trim()
        .to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Captures run greedy and may swallow the next value's token (`"Alpha
/// option. B"`); strip any trailing tokens that are themselves values.
fn trim_trailing_values(captured: &str, value: &str, all_values: &[String]) -> String {
    let mut text = captured.trim().to_string();
    loop {
        let Some(last) = text.split_whitespace().last().map(str::to_string) else {
            break;
        };
        if last != value && all_values.iter().any(|v| *v == last) {
            text = text[..text.len() - last.len()].trim_end().to_string();
        } else {
            break;
        }
    }
    text
}
