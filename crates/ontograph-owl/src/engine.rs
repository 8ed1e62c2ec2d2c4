//! Rule engine and phase pipeline.
//!
//! Dispatch is a priority-ordered rule table per phase: each phase walks the
//! whole tree pre-order and applies the first rule (highest priority, stable
//! on ties) whose predicate matches, at most one rule per node per phase.
//! The Cleanup phase is the exception: its fixers all operate on the schema
//! root, so it runs every matching rule in priority order instead of
//! stopping at the first.
//!
//! The processed ledger is consulted here before any predicate runs: a rule
//! already recorded for a node is never re-matched, which is what makes
//! repeated sweeps over the same tree idempotent. Writing the ledger is the
//! transform's job: a transform that bails out (unresolvable reference) may
//! leave the node unmarked so a later phase can retry.

use ontograph_rdf::Term;
use ontograph_xsd::{NodeId, NodeKind, SchemaTree};
use std::collections::HashSet;

use crate::context::Context;
use crate::rules;

/// A single transformation rule.
///
/// `matches` must be a pure predicate apart from context reads. `transform`
/// mutates the graph and side-tables and marks the node processed for this
/// rule. Returning `None` is not an error: the rule had nothing to emit for
/// this occurrence.
pub trait TransformRule {
    fn rule_id(&self) -> &'static str;

    /// Higher runs first within a phase.
    fn priority(&self) -> i32 {
        100
    }

    fn matches(&self, tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool;

    fn transform(&self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) -> Option<Term>;
}

// ============================================================================
// Phase
// ============================================================================

/// An ordered rule table with its own claimed-node set: one rule may claim a
/// node per phase, but different rules may claim it across phases.
pub struct Phase {
    name: &'static str,
    rules: Vec<Box<dyn TransformRule>>,
    claimed: HashSet<NodeId>,
    exhaustive: bool,
}

impl Phase {
    pub fn new(name: &'static str, rules: Vec<Box<dyn TransformRule>>) -> Self {
        Self::build(name, rules, false)
    }

    /// A phase that applies *every* matching rule per node, in priority
    /// order. Used by Cleanup, whose fixers all target the schema root.
    pub fn exhaustive(name: &'static str, rules: Vec<Box<dyn TransformRule>>) -> Self {
        Self::build(name, rules, true)
    }

    fn build(name: &'static str, mut rules: Vec<Box<dyn TransformRule>>, exhaustive: bool) -> Self {
        // Stable sort keeps registration order among equal priorities.
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
        Self {
            name,
            rules,
            claimed: HashSet::new(),
            exhaustive,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn execute(&mut self, tree: &SchemaTree, ctx: &mut Context) {
        tracing::info!(phase = self.name, rules = self.rules.len(), "executing phase");
        for node in tree.preorder(tree.root()) {
            if skipped_by_config(tree, node, ctx) {
                continue;
            }
            self.apply_to_node(tree, node, ctx);
        }
        tracing::info!(phase = self.name, "completed phase");
    }

    fn apply_to_node(&mut self, tree: &SchemaTree, node: NodeId, ctx: &mut Context) {
        if !self.exhaustive && self.claimed.contains(&node) {
            return;
        }
        for rule in &self.rules {
            if ctx.is_processed(node, rule.rule_id()) {
                continue;
            }
            if rule.matches(tree, node, ctx) {
                tracing::debug!(
                    rule = rule.rule_id(),
                    node = node.raw(),
                    kind = ?tree.node(node).kind,
                    name = tree.node(node).name.as_deref().unwrap_or(""),
                    "rule matched"
                );
                rule.transform(tree, node, ctx);
                self.claimed.insert(node);
                if !self.exhaustive {
                    return;
                }
            }
        }
    }
}

/// Declarations listed in the injected skip tables are invisible to every
/// rule.
fn skipped_by_config(tree: &SchemaTree, node: NodeId, ctx: &Context) -> bool {
    let data = tree.node(node);
    let Some(name) = data.name.as_deref() else {
        return false;
    };
    match data.kind {
        NodeKind::Element => ctx.special.skip_element(name),
        NodeKind::ComplexType | NodeKind::SimpleType => ctx.special.skip_type(name),
        _ => false,
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Fixed phase sequence: Class Creation → Property Creation → Enumeration →
/// Relationship → Cleanup. Every phase scans the entire tree; later phases
/// see everything earlier phases wrote.
pub struct Pipeline {
    phases: Vec<Phase>,
}

impl Pipeline {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    /// The standard rule set.
    pub fn standard() -> Self {
        Self::new(vec![
            Phase::new("class creation", rules::class_rules()),
            Phase::new("property creation", rules::property_rules()),
            Phase::new("enumeration", rules::enum_rules()),
            Phase::new("relationship", rules::relationship_rules()),
            Phase::exhaustive("cleanup", rules::cleanup_rules()),
        ])
    }

    pub fn execute(&mut self, tree: &SchemaTree, ctx: &mut Context) {
        tracing::info!(phases = self.phases.len(), "starting transformation pipeline");
        for phase in &mut self.phases {
            phase.execute(tree, ctx);
        }
        tracing::info!("transformation pipeline complete");
    }
}
