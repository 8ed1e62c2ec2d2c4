//! XML Schema node model for Ontograph.
//!
//! This crate provides the read-only tree the transformation engine walks:
//! an arena of typed schema nodes with stable `NodeId` identities. The tree
//! is immutable once built; all per-node transformation state lives in
//! side-tables keyed by `NodeId`, never on the nodes themselves.
//!
//! The `parser` module builds the tree from XSD text (quick-xml events).

pub mod parser;

use serde::{Deserialize, Serialize};

pub use parser::{parse_schema, ParseError};

// ============================================================================
// Node identity
// ============================================================================

/// Stable arena index of a schema node, assigned once at build time.
///
/// This is the key for every transformation side-table (processed ledger,
/// metadata, domain accumulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Node kinds
// ============================================================================

/// Closed set of schema construct kinds the engine dispatches over.
///
/// Unknown schema constructs are kept as `Other` so traversal still reaches
/// their descendants, but no rule ever matches them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Schema,
    ComplexType,
    SimpleType,
    Element,
    Sequence,
    Choice,
    Restriction,
    Enumeration,
    SimpleContent,
    Annotation,
    Documentation,
    Other,
}

impl NodeKind {
    /// Map an XSD local element name onto a node kind.
    pub fn from_local_name(local: &str) -> Self {
        match local {
            "schema" => NodeKind::Schema,
            "complexType" => NodeKind::ComplexType,
            "simpleType" => NodeKind::SimpleType,
            "element" => NodeKind::Element,
            "sequence" => NodeKind::Sequence,
            "choice" => NodeKind::Choice,
            "restriction" => NodeKind::Restriction,
            "enumeration" => NodeKind::Enumeration,
            "simpleContent" => NodeKind::SimpleContent,
            "annotation" => NodeKind::Annotation,
            "documentation" => NodeKind::Documentation,
            _ => NodeKind::Other,
        }
    }
}

// ============================================================================
// Occurrence bounds
// ============================================================================

/// Upper occurrence bound (`maxOccurs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

// ============================================================================
// Schema node
// ============================================================================

/// A single node of the schema tree.
///
/// Which optional fields are populated depends on the kind: `type_ref` and
/// `ref_name` on elements, `base` on restrictions, `value` on enumeration
/// facets, `text` on documentation nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaNode {
    pub kind: NodeKind,
    pub name: Option<String>,
    /// `type` attribute, possibly namespace-qualified (`xs:string`).
    pub type_ref: Option<String>,
    /// `ref` attribute: reference to a same-named top-level element.
    pub ref_name: Option<String>,
    /// `base` attribute of a restriction.
    pub base: Option<String>,
    /// `value` attribute of an enumeration facet.
    pub value: Option<String>,
    /// Text content of a documentation node, trimmed.
    pub text: Option<String>,
    pub min_occurs: Option<u32>,
    pub max_occurs: Option<MaxOccurs>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl SchemaNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            type_ref: None,
            ref_name: None,
            base: None,
            value: None,
            text: None,
            min_occurs: None,
            max_occurs: None,
            children: Vec::new(),
            parent: None,
        }
    }
}

// ============================================================================
// Schema tree
// ============================================================================

/// Arena-allocated schema tree.
///
/// Node 0 is always the root (normally the `schema` node). The tree never
/// changes after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
}

impl SchemaTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent` (or as the root when `parent` is None).
    pub fn push(&mut self, parent: Option<NodeId>, mut node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.parent = parent;
        self.nodes.push(node);
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    /// Build-time mutation seam; the tree is immutable once parsing is done.
    pub(crate) fn node_mut_for_build(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.iter().copied()
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            for child in self.node(cur).children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// First direct child of the given kind.
    pub fn find_child(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id).find(|c| self.node(*c).kind == kind)
    }

    /// First descendant of the given kind, document order, excluding `id`.
    pub fn find_descendant(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.preorder(id)
            .into_iter()
            .skip(1)
            .find(|n| self.node(*n).kind == kind)
    }

    /// All descendants of the given kind, document order, excluding `id`.
    pub fn descendants_of_kind(&self, id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.preorder(id)
            .into_iter()
            .skip(1)
            .filter(|n| self.node(*n).kind == kind)
            .collect()
    }

    /// First node anywhere in the tree carrying the given `name` attribute.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.preorder(self.root())
            .into_iter()
            .find(|n| self.node(*n).name.as_deref() == Some(name))
    }

    /// Named type declaration (`complexType` or `simpleType`) with the given
    /// name, if the schema defines one.
    pub fn find_type_decl(&self, name: &str) -> Option<NodeId> {
        self.preorder(self.root()).into_iter().find(|n| {
            let node = self.node(*n);
            matches!(node.kind, NodeKind::ComplexType | NodeKind::SimpleType)
                && node.name.as_deref() == Some(name)
        })
    }

    /// Named complex type declaration with the given name.
    pub fn find_complex_type(&self, name: &str) -> Option<NodeId> {
        self.preorder(self.root()).into_iter().find(|n| {
            let node = self.node(*n);
            node.kind == NodeKind::ComplexType && node.name.as_deref() == Some(name)
        })
    }

    /// Whether the node is a direct child of the schema root.
    pub fn is_top_level(&self, id: NodeId) -> bool {
        self.parent(id)
            .map(|p| self.node(p).kind == NodeKind::Schema)
            .unwrap_or(false)
    }

    /// Occurrence-based functional test: `maxOccurs="1"` is functional, and
    /// so is the default (both bounds absent). Everything else is not.
    pub fn is_functional(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match (node.min_occurs, node.max_occurs) {
            (_, Some(MaxOccurs::Bounded(1))) => true,
            (None, None) => true,
            _ => false,
        }
    }

    /// First `annotation/documentation` text directly under the node.
    pub fn documentation(&self, id: NodeId) -> Option<String> {
        let annotation = self.find_child(id, NodeKind::Annotation)?;
        self.children(annotation)
            .filter(|c| self.node(*c).kind == NodeKind::Documentation)
            .find_map(|c| self.node(c).text.clone())
    }

    /// Every documentation string under the node's annotation, in order.
    pub fn all_documentation(&self, id: NodeId) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(annotation) = self.find_child(id, NodeKind::Annotation) {
            for doc in self.descendants_of_kind(annotation, NodeKind::Documentation) {
                if let Some(text) = &self.node(doc).text {
                    out.push(text.clone());
                }
            }
        }
        out
    }

    /// Enumeration facet values under a restriction, in document order.
    pub fn enumeration_values(&self, restriction: NodeId) -> Vec<String> {
        self.children(restriction)
            .filter(|c| self.node(*c).kind == NodeKind::Enumeration)
            .filter_map(|c| self.node(c).value.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, name: Option<&str>) -> SchemaNode {
        let mut node = SchemaNode::new(kind);
        node.name = name.map(str::to_string);
        node
    }

    #[test]
    fn preorder_visits_parent_before_children() {
        let mut tree = SchemaTree::new();
        let root = tree.push(None, leaf(NodeKind::Schema, None));
        let ct = tree.push(Some(root), leaf(NodeKind::ComplexType, Some("Person")));
        let seq = tree.push(Some(ct), leaf(NodeKind::Sequence, None));
        let el = tree.push(Some(seq), leaf(NodeKind::Element, Some("firstName")));

        assert_eq!(tree.preorder(root), vec![root, ct, seq, el]);
        assert_eq!(tree.parent(el), Some(seq));
    }

    #[test]
    fn functional_defaults_to_true_when_bounds_absent() {
        let mut tree = SchemaTree::new();
        let root = tree.push(None, leaf(NodeKind::Schema, None));
        let plain = tree.push(Some(root), leaf(NodeKind::Element, Some("a")));
        let mut many = leaf(NodeKind::Element, Some("b"));
        many.max_occurs = Some(MaxOccurs::Unbounded);
        let many = tree.push(Some(root), many);
        let mut one = leaf(NodeKind::Element, Some("c"));
        one.min_occurs = Some(0);
        one.max_occurs = Some(MaxOccurs::Bounded(1));
        let one = tree.push(Some(root), one);

        assert!(tree.is_functional(plain));
        assert!(!tree.is_functional(many));
        assert!(tree.is_functional(one));
    }

    #[test]
    fn find_type_decl_skips_same_named_elements() {
        let mut tree = SchemaTree::new();
        let root = tree.push(None, leaf(NodeKind::Schema, None));
        tree.push(Some(root), leaf(NodeKind::Element, Some("Wagon")));
        let ct = tree.push(Some(root), leaf(NodeKind::ComplexType, Some("Wagon")));

        assert_eq!(tree.find_type_decl("Wagon"), Some(ct));
    }
}
