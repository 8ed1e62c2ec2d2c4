//! Transformation rules, grouped by phase.

pub mod class_rules;
pub mod cleanup_rules;
pub mod enum_rules;
pub mod property_rules;
pub mod relationship_rules;

mod helpers;

pub(crate) use helpers::*;

use crate::engine::TransformRule;

pub fn class_rules() -> Vec<Box<dyn TransformRule>> {
    vec![
        Box::new(class_rules::DetectSimpleTypeRule),
        Box::new(class_rules::ForcedClassElementRule),
        Box::new(class_rules::NamedComplexTypeRule),
        Box::new(class_rules::TopLevelNamedElementRule),
        Box::new(class_rules::AnonymousComplexTypeRule),
    ]
}

pub fn property_rules() -> Vec<Box<dyn TransformRule>> {
    vec![
        Box::new(property_rules::TopLevelSimpleElementRule),
        Box::new(property_rules::NumericTypePropertyRule),
        Box::new(property_rules::ChoiceElementPropertyRule),
        Box::new(property_rules::ElementReferenceRule),
        Box::new(property_rules::SimpleTypePropertyRule),
        Box::new(property_rules::InlineSimpleTypePropertyRule),
        Box::new(property_rules::ComplexElementPropertyRule),
        Box::new(property_rules::ChildElementPropertyRule),
        Box::new(property_rules::ComplexTypeReferenceRule),
    ]
}

pub fn enum_rules() -> Vec<Box<dyn TransformRule>> {
    vec![
        Box::new(enum_rules::NamedEnumTypeRule),
        Box::new(enum_rules::AnonymousEnumTypeRule),
    ]
}

pub fn relationship_rules() -> Vec<Box<dyn TransformRule>> {
    vec![
        Box::new(relationship_rules::ReferenceTrackingRule),
        Box::new(relationship_rules::SandwichElementPropertyRule),
    ]
}

pub fn cleanup_rules() -> Vec<Box<dyn TransformRule>> {
    vec![
        Box::new(cleanup_rules::OntologyHeaderRule),
        Box::new(cleanup_rules::ReferencedElementDomainRule),
        Box::new(cleanup_rules::DomainFixerRule),
        Box::new(cleanup_rules::PropertyTypeFixerRule),
        Box::new(cleanup_rules::RangeCollapseRule),
    ]
}
