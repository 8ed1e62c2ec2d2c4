//! Injected special-case table.
//!
//! Some declaration names need decisions the structural rules cannot make
//! (force-datatype, force-object, force-class, skip), and some type-name
//! patterns must always resolve to decimal-valued datatype properties. The
//! table is plain data, deserializable from JSON, and queried read-only by
//! every rule through the context.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::uri::lower_case_initial;

/// Forced-datatype entry: optional range override (`xsd:` qualified local
/// name) and an optional comment carried onto the property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcedDatatype {
    pub range: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialCases {
    /// Element names forced to become datatype properties.
    pub force_datatype: BTreeMap<String, ForcedDatatype>,
    /// Element names forced to become object properties.
    pub force_object: BTreeSet<String>,
    /// Type names that must become classes even when they look simple.
    pub force_class_types: BTreeSet<String>,
    /// Element names that must get a class even in property contexts.
    pub force_class_elements: BTreeSet<String>,
    /// Element names no rule should touch.
    pub skip_elements: BTreeSet<String>,
    /// Type names no rule should touch.
    pub skip_types: BTreeSet<String>,
    /// Type-name patterns that always resolve to decimal datatype properties.
    pub decimal_type_patterns: Vec<String>,
    #[serde(skip)]
    compiled: OnceLock<Vec<Regex>>,
}

impl Default for SpecialCases {
    fn default() -> Self {
        Self {
            force_datatype: BTreeMap::new(),
            force_object: BTreeSet::new(),
            force_class_types: BTreeSet::new(),
            force_class_elements: BTreeSet::new(),
            skip_elements: BTreeSet::new(),
            skip_types: BTreeSet::new(),
            decimal_type_patterns: vec![r"^Numeric\d+(-\d+)?$".to_string()],
            compiled: OnceLock::new(),
        }
    }
}

impl SpecialCases {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn patterns(&self) -> &[Regex] {
        self.compiled.get_or_init(|| {
            self.decimal_type_patterns
                .iter()
                .filter_map(|p| match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        tracing::warn!(pattern = %p, %err, "ignoring invalid decimal type pattern");
                        None
                    }
                })
                .collect()
        })
    }

    /// Whether a type name must resolve to a decimal datatype property.
    pub fn decimal_typed(&self, type_name: &str) -> bool {
        self.patterns().iter().any(|re| re.is_match(type_name))
    }

    /// Forced-datatype entry for a declaration name, matching both the raw
    /// and the property-normalized spelling.
    pub fn forced_datatype(&self, name: &str) -> Option<&ForcedDatatype> {
        self.force_datatype
            .get(name)
            .or_else(|| self.force_datatype.get(&lower_case_initial(name)))
    }

    pub fn forced_object(&self, name: &str) -> bool {
        self.force_object.contains(name) || self.force_object.contains(&lower_case_initial(name))
    }

    /// Whether a declaration can never become an object property: its type
    /// matches the decimal pattern, or it is listed as forced-datatype.
    pub fn never_object(&self, name: Option<&str>, type_ref: Option<&str>) -> bool {
        if let Some(type_name) = type_ref {
            if self.decimal_typed(type_name) {
                return true;
            }
        }
        name.map(|n| self.forced_datatype(n).is_some()).unwrap_or(false)
    }

    pub fn forced_class_type(&self, name: &str) -> bool {
        self.force_class_types.contains(name)
    }

    pub fn forced_class_element(&self, name: &str) -> bool {
        self.force_class_elements.contains(name)
    }

    pub fn skip_element(&self, name: &str) -> bool {
        self.skip_elements.contains(name)
    }

    pub fn skip_type(&self, name: &str) -> bool {
        self.skip_types.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_matches_numeric_types() {
        let special = SpecialCases::default();
        assert!(special.decimal_typed("Numeric5-5"));
        assert!(special.decimal_typed("Numeric12"));
        assert!(!special.decimal_typed("NumericCode"));
        assert!(!special.decimal_typed("WagonType"));
    }

    #[test]
    fn forced_datatype_matches_normalized_spelling() {
        let json = r#"{
            "force_datatype": { "airBrakedMass": { "range": "xsd:decimal" } }
        }"#;
        let special = SpecialCases::from_json(json).expect("parse");
        assert!(special.forced_datatype("AirBrakedMass").is_some());
        assert!(special.never_object(Some("AirBrakedMass"), None));
    }

    #[test]
    fn never_object_triggers_on_decimal_typed_references() {
        let special = SpecialCases::default();
        assert!(special.never_object(Some("anything"), Some("Numeric3-3")));
        assert!(!special.never_object(Some("anything"), Some("WagonType")));
    }

    #[test]
    fn json_round_trip_preserves_tables() {
        let mut special = SpecialCases::default();
        special.force_object.insert("administrativeDataSet".to_string());
        special
            .force_class_elements
            .insert("AdministrativeDataSet".to_string());
        let json = serde_json::to_string(&special).expect("serialize");
        let back = SpecialCases::from_json(&json).expect("parse");
        assert!(back.forced_object("AdministrativeDataSet"));
        assert!(back.forced_class_element("AdministrativeDataSet"));
    }
}
