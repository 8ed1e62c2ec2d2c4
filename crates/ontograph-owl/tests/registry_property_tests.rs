//! Property tests for the URI registry's uniqueness/idempotence guarantees.

use ontograph_owl::{NameEncoding, UriRegistry};
use proptest::prelude::*;

fn name_strategy() -> impl Strategy<Value = String> {
    // Raw declaration names as they appear in real schemas: word characters
    // plus the separators that sanitization must fold away.
    proptest::string::string_regex("[A-Za-z][A-Za-z0-9 _.:-]{0,24}").expect("valid regex")
}

proptest! {
    #[test]
    fn class_minting_is_idempotent(name in name_strategy()) {
        let mut reg = UriRegistry::new("http://example.org/onto#", NameEncoding::Underscore);
        let first = reg.class_uri(&name);
        let second = reg.class_uri(&name);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn property_minting_is_idempotent_and_normalized(name in name_strategy()) {
        let mut reg = UriRegistry::new("http://example.org/onto#", NameEncoding::Underscore);
        let first = reg.property_uri(&name);
        let second = reg.property_uri(&name);
        prop_assert_eq!(&first, &second);

        // The fragment only ever contains the sanitized alphabet.
        let fragment = first.rsplit('#').next().unwrap();
        prop_assert!(fragment.chars().all(|c| c.is_alphanumeric() || c == '_'));
    }

    #[test]
    fn distinct_names_never_share_a_property_uri(
        a in name_strategy(),
        b in name_strategy(),
    ) {
        let mut reg = UriRegistry::new("http://example.org/onto#", NameEncoding::Underscore);
        let ua = reg.property_uri(&a);
        let ub = reg.property_uri(&b);

        let norm = |s: &str| {
            let mut chars = s.chars();
            match chars.next() {
                Some(f) if f.is_alphabetic() => f.to_lowercase().collect::<String>() + chars.as_str(),
                _ => s.to_string(),
            }
        };
        if norm(&a) == norm(&b) {
            prop_assert_eq!(ua, ub);
        } else {
            prop_assert_ne!(ua, ub);
        }
    }
}
