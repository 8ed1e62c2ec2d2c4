//! Centralized URI minting.
//!
//! The registry is what makes repeated visits safe: the same raw class name
//! always resolves to the same IRI, property names are normalized and cached,
//! and a numeric suffix is applied only when two *different* logical names
//! sanitize to the same fragment. All caches live on the registry value:
//! one registry per run, owned by the context.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Whitespace policy for minted fragments. Purely cosmetic; uniqueness is
/// decided on the sanitized form either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameEncoding {
    #[default]
    Underscore,
    Dash,
    Plus,
    Percent,
    CamelCase,
}

impl std::str::FromStr for NameEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "underscore" => Ok(NameEncoding::Underscore),
            "dash" => Ok(NameEncoding::Dash),
            "plus" => Ok(NameEncoding::Plus),
            "percent" => Ok(NameEncoding::Percent),
            "camelcase" => Ok(NameEncoding::CamelCase),
            other => Err(format!("unknown name encoding: {other}")),
        }
    }
}

/// Mints and caches IRIs for classes, properties and concepts.
#[derive(Debug, Clone)]
pub struct UriRegistry {
    base: String,
    encoding: NameEncoding,
    class_uris: HashMap<String, String>,
    property_uris: HashMap<String, String>,
    concept_uris: HashMap<String, String>,
    used_property_fragments: HashSet<String>,
    used_concept_fragments: HashSet<String>,
}

impl UriRegistry {
    pub fn new(base_uri: &str, encoding: NameEncoding) -> Self {
        let mut base = base_uri.to_string();
        if !base.ends_with('#') && !base.ends_with('/') {
            base.push('#');
        }
        tracing::debug!(base = %base, "initialized URI registry");
        Self {
            base,
            encoding,
            class_uris: HashMap::new(),
            property_uris: HashMap::new(),
            concept_uris: HashMap::new(),
            used_property_fragments: HashSet::new(),
            used_concept_fragments: HashSet::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Base namespace without its trailing `#`/`/`: the ontology IRI.
    pub fn ontology_iri(&self) -> &str {
        self.base.trim_end_matches(['#', '/'])
    }

    /// IRI for a class. Repeated requests for the same raw name return the
    /// identical IRI; class fragments are never suffixed, so same-named
    /// declarations collapse onto one class.
    pub fn class_uri(&mut self, name: &str) -> String {
        assert!(
            !name.trim().is_empty(),
            "URI registry asked to mint a class from an empty name"
        );
        if let Some(uri) = self.class_uris.get(name) {
            return uri.clone();
        }
        let fragment = self.sanitize(name, false);
        let uri = format!("{}{}", self.base, fragment);
        self.class_uris.insert(name.to_string(), uri.clone());
        tracing::debug!(%name, %uri, "minted class URI");
        uri
    }

    /// The IRI `class_uri` would return, without registering anything.
    /// Exact because class fragments are never suffixed.
    pub fn peek_class_uri(&self, name: &str) -> String {
        if let Some(uri) = self.class_uris.get(name) {
            return uri.clone();
        }
        format!("{}{}", self.base, self.sanitize(name, false))
    }

    /// IRI for a property. The name is normalized (initial lower-cased) and
    /// cached by that form; a `_N` suffix is applied only when a *different*
    /// normalized name sanitizes to an already-used fragment.
    pub fn property_uri(&mut self, name: &str) -> String {
        assert!(
            !name.trim().is_empty(),
            "URI registry asked to mint a property from an empty name"
        );
        let normalized = lower_case_initial(name);
        if let Some(uri) = self.property_uris.get(&normalized) {
            return uri.clone();
        }
        let mut fragment = self.sanitize(&normalized, true);
        if self.used_property_fragments.contains(&fragment) {
            fragment = disambiguate(&fragment, &self.used_property_fragments);
        }
        let uri = format!("{}{}", self.base, fragment);
        self.property_uris.insert(normalized, uri.clone());
        self.used_property_fragments.insert(fragment);
        tracing::debug!(%name, %uri, "minted property URI");
        uri
    }

    /// The IRI `property_uri` most likely returns, without registering:
    /// the cached IRI when the name is known, else the unsuffixed fragment.
    pub fn peek_property_uri(&self, name: &str) -> String {
        let normalized = lower_case_initial(name);
        if let Some(uri) = self.property_uris.get(&normalized) {
            return uri.clone();
        }
        format!("{}{}", self.base, self.sanitize(&normalized, true))
    }

    /// IRI for a controlled-vocabulary concept, keyed by scheme and value.
    pub fn concept_uri(&mut self, scheme_uri: &str, value: &str) -> String {
        assert!(
            !value.trim().is_empty(),
            "URI registry asked to mint a concept from an empty value"
        );
        let key = format!("{scheme_uri}_{value}");
        if let Some(uri) = self.concept_uris.get(&key) {
            return uri.clone();
        }
        let scheme_local = scheme_uri.rsplit(['#', '/']).next().unwrap_or(scheme_uri);
        let mut fragment = self.sanitize(&format!("{scheme_local}_{value}"), false);
        if self.used_concept_fragments.contains(&fragment) {
            fragment = disambiguate(&fragment, &self.used_concept_fragments);
        }
        let namespace = match scheme_uri.rfind('#') {
            Some(pos) => &scheme_uri[..=pos],
            None => self.base.as_str(),
        };
        let uri = format!("{namespace}{fragment}");
        self.concept_uris.insert(key, uri.clone());
        self.used_concept_fragments.insert(fragment);
        tracing::debug!(%value, %uri, "minted concept URI");
        uri
    }

    /// Sanitize a raw declaration name into a fragment: strip an embedded
    /// namespace qualifier, apply the whitespace policy, replace anything
    /// left that is not alphanumeric or underscore.
    fn sanitize(&self, name: &str, is_property: bool) -> String {
        let mut name = name;
        if let Some(pos) = name.rfind('}') {
            name = &name[pos + 1..];
        }
        if let Some(pos) = name.rfind(':') {
            name = &name[pos + 1..];
        }

        let encoded = encode_whitespace(name, self.encoding);
        let mut out: String = encoded
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || allowed_by_policy(c, self.encoding) {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if is_property {
            out = lower_case_initial(&out);
        }
        out
    }
}

fn allowed_by_policy(c: char, encoding: NameEncoding) -> bool {
    match encoding {
        NameEncoding::Underscore | NameEncoding::CamelCase => false,
        NameEncoding::Dash => c == '-',
        NameEncoding::Plus => c == '+',
        NameEncoding::Percent => c == '%',
    }
}

fn encode_whitespace(text: &str, encoding: NameEncoding) -> String {
    match encoding {
        NameEncoding::Underscore => text.replace(' ', "_"),
        NameEncoding::Dash => text.replace(' ', "-"),
        NameEncoding::Plus => text.replace(' ', "+"),
        NameEncoding::Percent => text.replace(' ', "%20"),
        NameEncoding::CamelCase => {
            let mut words = text.split_whitespace();
            let mut out = match words.next() {
                Some(first) => first.to_string(),
                None => return text.to_string(),
            };
            for word in words {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                }
            }
            out
        }
    }
}

fn disambiguate(fragment: &str, used: &HashSet<String>) -> String {
    let mut counter = 1u32;
    loop {
        let candidate = format!("{fragment}_{counter}");
        if !used.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Lower-case the first character when it is alphabetic.
pub fn lower_case_initial(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {
            first.to_lowercase().collect::<String>() + chars.as_str()
        }
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UriRegistry {
        UriRegistry::new("http://example.org/onto", NameEncoding::Underscore)
    }

    #[test]
    fn base_gains_fragment_separator() {
        assert_eq!(registry().base(), "http://example.org/onto#");
    }

    #[test]
    fn class_uris_are_idempotent() {
        let mut reg = registry();
        let a = reg.class_uri("WagonDataSet");
        let b = reg.class_uri("WagonDataSet");
        assert_eq!(a, b);
        assert_eq!(a, "http://example.org/onto#WagonDataSet");
    }

    #[test]
    fn property_names_are_normalized_and_cached() {
        let mut reg = registry();
        let a = reg.property_uri("FirstName");
        let b = reg.property_uri("firstName");
        assert_eq!(a, b);
        assert_eq!(a, "http://example.org/onto#firstName");
    }

    #[test]
    fn colliding_sanitized_forms_get_numeric_suffixes() {
        let mut reg = registry();
        let a = reg.property_uri("load-limit");
        let b = reg.property_uri("load limit");
        let c = reg.property_uri("load.limit");
        assert_eq!(a, "http://example.org/onto#load_limit");
        assert_eq!(b, "http://example.org/onto#load_limit_1");
        assert_eq!(c, "http://example.org/onto#load_limit_2");
        // Re-requests still hit the cache, no further suffixes.
        assert_eq!(reg.property_uri("load-limit"), a);
    }

    #[test]
    fn concept_uris_append_value_to_scheme_local_name() {
        let mut reg = registry();
        let scheme = reg.class_uri("BrakeType");
        let concept = reg.concept_uri(&scheme, "G");
        assert_eq!(concept, "http://example.org/onto#BrakeType_G");
        assert_eq!(reg.concept_uri(&scheme, "G"), concept);
    }

    #[test]
    fn embedded_namespace_qualifiers_are_stripped() {
        let mut reg = registry();
        let uri = reg.class_uri("{http://www.w3.org/2001/XMLSchema}WagonType");
        assert_eq!(uri, "http://example.org/onto#WagonType");
    }

    #[test]
    fn camel_case_encoding_joins_words() {
        let mut reg = UriRegistry::new("http://example.org/onto#", NameEncoding::CamelCase);
        assert_eq!(
            reg.class_uri("wagon data set"),
            "http://example.org/onto#wagonDataSet"
        );
    }

    #[test]
    #[should_panic(expected = "empty name")]
    fn minting_from_an_empty_name_aborts() {
        registry().class_uri("  ");
    }
}
