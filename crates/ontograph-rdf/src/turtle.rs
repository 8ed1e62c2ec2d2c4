//! Deterministic Turtle writer.
//!
//! Output is one sorted statement per line with qname compression against a
//! fixed prefix block. Blank labels reuse the store's allocation numbers, so
//! two identical stores serialize to identical bytes.

use crate::{vocab, Term, TripleStore};
use std::fmt::Write as _;

const PREFIXES: &[(&str, &str)] = &[
    ("rdf", vocab::RDF_NS),
    ("rdfs", vocab::RDFS_NS),
    ("owl", vocab::OWL_NS),
    ("skos", vocab::SKOS_NS),
    ("xsd", vocab::XSD_NS),
    ("dcterms", vocab::DC_NS),
];

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn qname(iri: &str, base: Option<&str>) -> Option<String> {
    let mut table: Vec<(&str, &str)> = PREFIXES.to_vec();
    if let Some(base_ns) = base {
        table.push(("base", base_ns));
    }
    for (prefix, ns) in table {
        if let Some(local) = iri.strip_prefix(ns) {
            if !local.is_empty() && local.chars().all(is_local_char) && !local.starts_with('.') {
                return Some(format!("{prefix}:{local}"));
            }
        }
    }
    None
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn render_term(term: &Term, base: Option<&str>) -> String {
    match term {
        Term::Iri(iri) => qname(iri, base).unwrap_or_else(|| format!("<{iri}>")),
        Term::Blank(id) => format!("_:b{id}"),
        Term::Literal {
            lexical,
            lang,
            datatype,
        } => {
            let mut out = format!("\"{}\"", escape_literal(lexical));
            if let Some(lang) = lang {
                let _ = write!(out, "@{lang}");
            } else if let Some(dt) = datatype {
                let dt = qname(dt, base).unwrap_or_else(|| format!("<{dt}>"));
                let _ = write!(out, "^^{dt}");
            }
            out
        }
    }
}

/// Serialize the store as Turtle. `base` adds a `base:` prefix for the
/// ontology namespace.
pub fn write_turtle(store: &TripleStore, base: Option<&str>) -> String {
    let mut out = String::new();
    for (prefix, ns) in PREFIXES {
        let _ = writeln!(out, "@prefix {prefix}: <{ns}> .");
    }
    if let Some(base_ns) = base {
        let _ = writeln!(out, "@prefix base: <{base_ns}> .");
    }
    let _ = writeln!(out);

    for triple in store.iter() {
        let s = render_term(&triple.subject, base);
        let p = if triple.predicate == vocab::RDF_TYPE {
            "a".to_string()
        } else {
            qname(&triple.predicate, base).unwrap_or_else(|| format!("<{}>", triple.predicate))
        };
        let o = render_term(&triple.object, base);
        let _ = writeln!(out, "{s} {p} {o} .");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compresses_known_namespaces() {
        let mut store = TripleStore::new();
        store.insert(
            Term::iri("http://example.org/onto#Person"),
            vocab::RDF_TYPE,
            Term::iri(vocab::OWL_CLASS),
        );
        let ttl = write_turtle(&store, Some("http://example.org/onto#"));
        assert!(ttl.contains("base:Person a owl:Class ."), "got:\n{ttl}");
    }

    #[test]
    fn escapes_literals_and_tags_languages() {
        let mut store = TripleStore::new();
        store.insert(
            Term::iri("http://example.org/onto#p"),
            vocab::SKOS_DEFINITION,
            Term::literal_lang("say \"hi\"\nthen leave", "en"),
        );
        let ttl = write_turtle(&store, Some("http://example.org/onto#"));
        assert!(ttl.contains(r#""say \"hi\"\nthen leave"@en"#), "got:\n{ttl}");
    }

    #[test]
    fn identical_stores_serialize_identically() {
        let build = || {
            let mut store = TripleStore::new();
            let union = store.fresh_blank();
            store.insert(union.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_CLASS));
            store.insert(
                Term::iri("http://example.org/onto#p"),
                vocab::RDFS_DOMAIN,
                union,
            );
            store
        };
        assert_eq!(
            write_turtle(&build(), Some("http://example.org/onto#")),
            write_turtle(&build(), Some("http://example.org/onto#"))
        );
    }
}
