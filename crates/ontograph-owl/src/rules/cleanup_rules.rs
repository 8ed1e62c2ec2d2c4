//! Cleanup phase: ontology header, referenced-element domain replay, and the
//! consistency fixers. The phase runs exhaustively over the schema root, so
//! every fixer gets its turn in priority order.

use ontograph_rdf::{vocab, Term};
use ontograph_xsd::{NodeId, NodeKind, SchemaTree};

use crate::context::Context;
use crate::engine::TransformRule;
use crate::rules::set_property_domain;
use crate::uri::lower_case_initial;

/// Asserts the ontology header: typing, label, and schema-level
/// documentation when present.
pub struct OntologyHeaderRule;

impl TransformRule for OntologyHeaderRule {
    fn rule_id(&self) -> &'static str {
        "ontology_header"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        tree.node(node).kind == NodeKind::Schema
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let iri = ctx.uris.ontology_iri().to_string();
        ctx.store.insert(
            Term::iri(&iri),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_ONTOLOGY),
        );
        match tree.documentation(node) {
            Some(doc) => ctx.add_comment(&iri, &doc),
            None => ctx.add_comment(&iri, "Ontology generated from an XML Schema definition."),
        }
        ctx.mark_processed(node, self.rule_id());
        Some(Term::iri(iri))
    }
}

/// Replays tracked reference sites through the shared domain logic, so a
/// property referenced from several owners accumulates all of them before
/// the domain fixer runs.
pub struct ReferencedElementDomainRule;

impl TransformRule for ReferencedElementDomainRule {
    fn rule_id(&self) -> &'static str {
        "referenced_element_domain"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        tree.node(node).kind == NodeKind::Schema && !ctx.reference_contexts.is_empty()
    }

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let contexts = ctx.reference_contexts.clone();
        let mut replayed = 0usize;
        for (ref_name, sites) in contexts {
            let property_name = lower_case_initial(&ref_name);
            let Some(reg) = ctx.registered_property(&property_name) else {
                tracing::warn!(%ref_name, "no registered property for tracked reference");
                continue;
            };
            let property_uri = reg.uri.clone();
            for site in sites {
                let already = ctx.store.contains(
                    &Term::iri(&property_uri),
                    vocab::RDFS_DOMAIN,
                    &Term::iri(&site.parent_uri),
                );
                // Record the candidate either way; union synthesis needs the
                // full owner set.
                ctx.record_domain_candidate(&property_uri, &site.parent_uri);
                if !already {
                    set_property_domain(tree, site.node, &property_uri, ctx);
                    replayed += 1;
                }
            }
        }
        tracing::debug!(replayed, "replayed reference-site domains");
        ctx.mark_processed(node, self.rule_id());
        None
    }
}

/// Union-domain synthesis: a property with several candidate owners loses
/// its direct domain triples and gains one anonymous union class over an
/// ordered list of the candidates. Single-candidate properties get the
/// direct domain if it is still missing, and properties with no domain at
/// all fall back to their recorded choice-group parent.
pub struct DomainFixerRule;

impl TransformRule for DomainFixerRule {
    fn rule_id(&self) -> &'static str {
        "domain_fixer"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
        tree.node(node).kind == NodeKind::Schema
            && (!ctx.domain_candidates.is_empty() || !ctx.choice_refs.is_empty())
    }

    fn transform(&self, _tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let mut unions = 0usize;
        let mut singles = 0usize;

        for (property_uri, domains) in ctx.domain_candidates.clone() {
            let subject = Term::iri(&property_uri);
            if domains.len() > 1 {
                ctx.store
                    .remove_matching(Some(&subject), Some(vocab::RDFS_DOMAIN), None);
                let members: Vec<Term> = domains.iter().map(Term::iri).collect();
                let list = ctx.store.insert_list(&members);
                let union = ctx.store.fresh_blank();
                ctx.store
                    .insert(union.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_CLASS));
                ctx.store
                    .insert(union.clone(), vocab::OWL_UNION_OF, list);
                ctx.store.insert(subject, vocab::RDFS_DOMAIN, union);
                unions += 1;
            } else if let Some(domain) = domains.iter().next() {
                let object = Term::iri(domain);
                if !ctx.store.contains(&subject, vocab::RDFS_DOMAIN, &object) {
                    ctx.store.insert(subject, vocab::RDFS_DOMAIN, object);
                    singles += 1;
                }
            }
        }

        // Properties that never resolved a domain inline: fall back to the
        // choice-group owner recorded when their group was expanded.
        for type_iri in [vocab::OWL_DATATYPE_PROPERTY, vocab::OWL_OBJECT_PROPERTY] {
            for property in ctx.store.subjects_with(vocab::RDF_TYPE, &Term::iri(type_iri)) {
                if !ctx
                    .store
                    .matching(Some(&property), Some(vocab::RDFS_DOMAIN), None)
                    .is_empty()
                {
                    continue;
                }
                let Some(local) = property.local_name().map(str::to_string) else {
                    continue;
                };
                let capitalized = capitalize_initial(&local);
                let parent = ctx
                    .choice_refs
                    .get(&local)
                    .or_else(|| ctx.choice_refs.get(&capitalized))
                    .cloned();
                if let Some(parent) = parent {
                    let class_uri = ctx.ensure_class(&parent.parent_name);
                    ctx.store
                        .insert(property.clone(), vocab::RDFS_DOMAIN, Term::iri(&class_uri));
                    tracing::debug!(
                        property = %local,
                        parent = %parent.parent_name,
                        "assigned choice-group fallback domain"
                    );
                    singles += 1;
                }
            }
        }

        tracing::info!(unions, singles, "domain fixer finished");
        ctx.mark_processed(node, self.rule_id());
        None
    }
}

fn capitalize_initial(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Repairs properties typed both ways. Datatype typing wins: the object
/// typing and every non-literal range are dropped, unless the special-case
/// table forces the property to be an object property, in which case the
/// repair runs the other way around.
pub struct PropertyTypeFixerRule;

impl TransformRule for PropertyTypeFixerRule {
    fn rule_id(&self) -> &'static str {
        "property_type_fixer"
    }

    fn priority(&self) -> i32 {
        5
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        tree.node(node).kind == NodeKind::Schema
    }

    fn transform(&self, _tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let datatype_typed = ctx
            .store
            .subjects_with(vocab::RDF_TYPE, &Term::iri(vocab::OWL_DATATYPE_PROPERTY));
        let conflicted: Vec<Term> = datatype_typed
            .into_iter()
            .filter(|s| {
                ctx.store.contains(
                    s,
                    vocab::RDF_TYPE,
                    &Term::iri(vocab::OWL_OBJECT_PROPERTY),
                )
            })
            .collect();

        for property in conflicted {
            let name = property_label(ctx, &property);
            let force_object = name
                .as_deref()
                .map(|n| ctx.special.forced_object(n))
                .unwrap_or(false);

            if force_object {
                tracing::debug!(property = ?name, "conflict repaired toward object property");
                ctx.store.remove_matching(
                    Some(&property),
                    Some(vocab::RDF_TYPE),
                    Some(&Term::iri(vocab::OWL_DATATYPE_PROPERTY)),
                );
                for range in ctx.store.objects_of(&property, vocab::RDFS_RANGE) {
                    if range
                        .as_iri()
                        .map(vocab::is_literal_datatype)
                        .unwrap_or(false)
                    {
                        ctx.store
                            .remove_matching(Some(&property), Some(vocab::RDFS_RANGE), Some(&range));
                    }
                }
            } else {
                tracing::debug!(property = ?name, "conflict repaired toward datatype property");
                ctx.store.remove_matching(
                    Some(&property),
                    Some(vocab::RDF_TYPE),
                    Some(&Term::iri(vocab::OWL_OBJECT_PROPERTY)),
                );
                for range in ctx.store.objects_of(&property, vocab::RDFS_RANGE) {
                    let literal_range = range
                        .as_iri()
                        .map(vocab::is_literal_datatype)
                        .unwrap_or(false);
                    if !literal_range {
                        ctx.store
                            .remove_matching(Some(&property), Some(vocab::RDFS_RANGE), Some(&range));
                    }
                }
            }
        }

        ctx.mark_processed(node, self.rule_id());
        None
    }
}

fn property_label(ctx: &Context, property: &Term) -> Option<String> {
    ctx.store
        .objects_of(property, vocab::RDFS_LABEL)
        .into_iter()
        .find_map(|o| match o {
            Term::Literal { lexical, .. } => Some(lexical),
            _ => None,
        })
        .or_else(|| property.local_name().map(str::to_string))
}

/// A datatype property that ended up with both `xsd:string` and a stricter
/// string alias keeps only the generic string range.
pub struct RangeCollapseRule;

impl TransformRule for RangeCollapseRule {
    fn rule_id(&self) -> &'static str {
        "range_collapse"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, _ctx: &Context) -> bool {
        tree.node(node).kind == NodeKind::Schema
    }

    fn transform(&self, _tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term> {
        let properties = ctx
            .store
            .subjects_with(vocab::RDF_TYPE, &Term::iri(vocab::OWL_DATATYPE_PROPERTY));
        for property in properties {
            let ranges = ctx.store.objects_of(&property, vocab::RDFS_RANGE);
            if ranges.len() < 2 {
                continue;
            }
            let has_string = ranges
                .iter()
                .any(|r| r.as_iri() == Some(vocab::XSD_STRING));
            if !has_string {
                continue;
            }
            for range in ranges {
                if range.as_iri().map(vocab::is_string_alias).unwrap_or(false) {
                    tracing::debug!(property = ?property.local_name(), "collapsed duplicate string range");
                    ctx.store
                        .remove_matching(Some(&property), Some(vocab::RDFS_RANGE), Some(&range));
                }
            }
        }
        ctx.mark_processed(node, self.rule_id());
        None
    }
}
