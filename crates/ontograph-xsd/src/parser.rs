//! XSD text → schema tree (quick-xml event loop).
//!
//! The parser is deliberately shallow: it keeps the constructs the
//! transformation engine dispatches over and files everything else under
//! `NodeKind::Other` so traversal still reaches nested declarations. XML
//! comments and processing instructions are dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::{MaxOccurs, NodeId, NodeKind, SchemaNode, SchemaTree};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
    #[error("invalid attribute value for {attribute}: {value:?}")]
    InvalidAttribute { attribute: String, value: String },
    #[error("document contains no schema element")]
    NoRoot,
}

/// Strip any namespace prefix from a qualified tag name.
fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().rposition(|b| *b == b':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}

fn parse_max_occurs(value: &str) -> Result<MaxOccurs, ParseError> {
    if value == "unbounded" {
        return Ok(MaxOccurs::Unbounded);
    }
    value
        .parse::<u32>()
        .map(MaxOccurs::Bounded)
        .map_err(|_| ParseError::InvalidAttribute {
            attribute: "maxOccurs".to_string(),
            value: value.to_string(),
        })
}

fn node_from_start(start: &BytesStart<'_>) -> Result<SchemaNode, ParseError> {
    let local = local_name(start.name().as_ref()).to_vec();
    let kind = NodeKind::from_local_name(&String::from_utf8_lossy(&local));
    let mut node = SchemaNode::new(kind);

    for attr in start.attributes().with_checks(false).flatten() {
        let key = local_name(attr.key.as_ref()).to_vec();
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match key.as_slice() {
            b"name" => node.name = Some(value),
            b"type" => node.type_ref = Some(value),
            b"ref" => node.ref_name = Some(value),
            b"base" => node.base = Some(value),
            b"value" => node.value = Some(value),
            b"minOccurs" => {
                node.min_occurs =
                    Some(
                        value
                            .parse::<u32>()
                            .map_err(|_| ParseError::InvalidAttribute {
                                attribute: "minOccurs".to_string(),
                                value,
                            })?,
                    )
            }
            b"maxOccurs" => node.max_occurs = Some(parse_max_occurs(&value)?),
            _ => {}
        }
    }

    Ok(node)
}

/// Parse XSD text into a schema tree.
pub fn parse_schema(input: &str) -> Result<SchemaTree, ParseError> {
    let mut reader = Reader::from_reader(input.as_bytes());
    reader.trim_text(true);

    let mut tree = SchemaTree::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ParseError::Xml {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;

        match event {
            Event::Start(start) => {
                let node = node_from_start(&start)?;
                let id = tree.push(stack.last().copied(), node);
                stack.push(id);
            }
            Event::Empty(start) => {
                let node = node_from_start(&start)?;
                tree.push(stack.last().copied(), node);
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) => {
                if let Some(current) = stack.last().copied() {
                    if tree.node(current).kind == NodeKind::Documentation {
                        let decoded = text.unescape().map_err(|e| ParseError::Xml {
                            position: reader.buffer_position() as u64,
                            message: e.to_string(),
                        })?;
                        let trimmed = decoded.trim();
                        if !trimmed.is_empty() {
                            append_text(&mut tree, current, trimmed);
                        }
                    }
                }
            }
            Event::Eof => break,
            // Comments, CDATA, PIs and the XML declaration carry nothing the
            // node model keeps.
            _ => {}
        }
        buf.clear();
    }

    if tree.is_empty() {
        return Err(ParseError::NoRoot);
    }

    tracing::debug!(nodes = tree.len(), "parsed schema tree");
    Ok(tree)
}

fn append_text(tree: &mut SchemaTree, id: NodeId, text: &str) {
    // SchemaTree hands out immutable nodes only; texts are accumulated
    // through this single build-time seam.
    let node = tree.node_mut_for_build(id);
    match &mut node.text {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => node.text = Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Person">
    <xs:annotation>
      <xs:documentation>A natural person.</xs:documentation>
    </xs:annotation>
    <xs:sequence>
      <xs:element name="firstName" type="xs:string"/>
      <xs:element name="age" type="xs:integer" minOccurs="0"/>
      <xs:element name="nickname" type="xs:string" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="Person" type="Person"/>
</xs:schema>
"#;

    #[test]
    fn parses_named_complex_type_with_sequence() {
        let tree = parse_schema(PERSON_XSD).expect("parse");
        let root = tree.root();
        assert_eq!(tree.node(root).kind, NodeKind::Schema);

        let ct = tree.find_complex_type("Person").expect("complex type");
        assert_eq!(tree.documentation(ct).as_deref(), Some("A natural person."));

        let seq = tree.find_child(ct, NodeKind::Sequence).expect("sequence");
        let fields: Vec<_> = tree
            .children(seq)
            .filter_map(|c| tree.node(c).name.clone())
            .collect();
        assert_eq!(fields, vec!["firstName", "age", "nickname"]);
    }

    #[test]
    fn occurrence_bounds_are_parsed() {
        let tree = parse_schema(PERSON_XSD).expect("parse");
        let age = tree.find_by_name("age").expect("age");
        assert_eq!(tree.node(age).min_occurs, Some(0));

        let nickname = tree.find_by_name("nickname").expect("nickname");
        assert_eq!(tree.node(nickname).max_occurs, Some(MaxOccurs::Unbounded));
        assert!(!tree.is_functional(nickname));
    }

    #[test]
    fn rejects_unparseable_bounds() {
        let bad = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="a" maxOccurs="lots"/>
</xs:schema>"#;
        let err = parse_schema(bad).expect_err("should fail");
        assert!(matches!(err, ParseError::InvalidAttribute { .. }));
    }

    #[test]
    fn unknown_constructs_become_other_nodes() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:attributeGroup name="common">
    <xs:attribute name="id" type="xs:string"/>
  </xs:attributeGroup>
</xs:schema>"#;
        let tree = parse_schema(xsd).expect("parse");
        let group = tree.find_by_name("common").expect("group");
        assert_eq!(tree.node(group).kind, NodeKind::Other);
    }
}
