//! In-memory triple store for Ontograph.
//!
//! A small, deterministic statement set: ordered iteration, pattern query
//! and removal, blank-node allocation, and RDF-list construction for union
//! classes. Determinism matters: running the same transformation twice must
//! produce byte-identical output, so both the statement order and the blank
//! label sequence are stable.

pub mod turtle;
pub mod vocab;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Terms
// ============================================================================

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    Iri(String),
    Blank(u64),
    Literal {
        lexical: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            lexical: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn literal_lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal {
            lexical: value.into(),
            lang: Some(lang.into()),
            datatype: None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Fragment after the last `#` or `/` of an IRI term.
    pub fn local_name(&self) -> Option<&str> {
        self.as_iri().map(vocab::local_name)
    }
}

/// One statement. The subject is an IRI or blank node; the predicate is
/// always an IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Mutable statement set with deterministic iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripleStore {
    triples: BTreeSet<Triple>,
    next_blank: u64,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Insert a statement; duplicates are silently collapsed.
    pub fn insert(&mut self, subject: Term, predicate: impl Into<String>, object: Term) {
        self.triples.insert(Triple::new(subject, predicate, object));
    }

    pub fn contains(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        self.triples.contains(&Triple {
            subject: subject.clone(),
            predicate: predicate.to_string(),
            object: object.clone(),
        })
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    /// Remove every statement matching the pattern (`None` = wildcard).
    /// Returns the number of statements removed.
    pub fn remove_matching(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> usize {
        let doomed: Vec<Triple> = self
            .matching(subject, predicate, object)
            .into_iter()
            .collect();
        for t in &doomed {
            self.triples.remove(t);
        }
        doomed.len()
    }

    /// Statements matching the pattern (`None` = wildcard), in store order.
    pub fn matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        self.triples
            .iter()
            .filter(|t| {
                subject.map_or(true, |s| &t.subject == s)
                    && predicate.map_or(true, |p| t.predicate == p)
                    && object.map_or(true, |o| &t.object == o)
            })
            .cloned()
            .collect()
    }

    /// Distinct subjects of statements with the given predicate and object.
    pub fn subjects_with(&self, predicate: &str, object: &Term) -> Vec<Term> {
        let mut out: Vec<Term> = Vec::new();
        for t in self.matching(None, Some(predicate), Some(object)) {
            if !out.contains(&t.subject) {
                out.push(t.subject);
            }
        }
        out
    }

    /// Objects of statements with the given subject and predicate.
    pub fn objects_of(&self, subject: &Term, predicate: &str) -> Vec<Term> {
        self.matching(Some(subject), Some(predicate), None)
            .into_iter()
            .map(|t| t.object)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Allocate a fresh blank node. Allocation order is part of the store's
    /// deterministic behavior.
    pub fn fresh_blank(&mut self) -> Term {
        let id = self.next_blank;
        self.next_blank += 1;
        Term::Blank(id)
    }

    /// Build an ordered RDF list (`rdf:first`/`rdf:rest`/`rdf:nil`) over the
    /// items and return its head. An empty slice yields `rdf:nil`.
    pub fn insert_list(&mut self, items: &[Term]) -> Term {
        if items.is_empty() {
            return Term::iri(vocab::RDF_NIL);
        }
        let head = self.fresh_blank();
        let mut cell = head.clone();
        for (i, item) in items.iter().enumerate() {
            self.insert(cell.clone(), vocab::RDF_FIRST, item.clone());
            let rest = if i + 1 == items.len() {
                Term::iri(vocab::RDF_NIL)
            } else {
                self.fresh_blank()
            };
            self.insert(cell.clone(), vocab::RDF_REST, rest.clone());
            cell = rest;
        }
        head
    }
}

impl<'a> IntoIterator for &'a TripleStore {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut store = TripleStore::new();
        let s = Term::iri("http://example.org/a");
        store.insert(s.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_CLASS));
        store.insert(s.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_CLASS));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_matching_with_wildcards() {
        let mut store = TripleStore::new();
        let s = Term::iri("http://example.org/p");
        store.insert(s.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_DATATYPE_PROPERTY));
        store.insert(s.clone(), vocab::RDFS_LABEL, Term::literal("p"));
        store.insert(
            Term::iri("http://example.org/q"),
            vocab::RDFS_LABEL,
            Term::literal("q"),
        );

        let removed = store.remove_matching(Some(&s), None, None);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_construction_chains_to_nil() {
        let mut store = TripleStore::new();
        let items = vec![
            Term::iri("http://example.org/A"),
            Term::iri("http://example.org/B"),
            Term::iri("http://example.org/C"),
        ];
        let head = store.insert_list(&items);

        let mut cell = head;
        let mut collected = Vec::new();
        loop {
            let firsts = store.objects_of(&cell, vocab::RDF_FIRST);
            assert_eq!(firsts.len(), 1);
            collected.push(firsts[0].clone());
            let rests = store.objects_of(&cell, vocab::RDF_REST);
            assert_eq!(rests.len(), 1);
            if rests[0].as_iri() == Some(vocab::RDF_NIL) {
                break;
            }
            cell = rests[0].clone();
        }
        assert_eq!(collected, items);
    }

    #[test]
    fn blank_allocation_is_sequential() {
        let mut store = TripleStore::new();
        assert_eq!(store.fresh_blank(), Term::Blank(0));
        assert_eq!(store.fresh_blank(), Term::Blank(1));
    }
}
