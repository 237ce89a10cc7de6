//! Rule expression tree.
//!
//! A rule is a tree of typed nodes ("ludemes"). The variant set is closed:
//!
//! - [`BooleanNode`]: predicates and puzzle constraints
//! - [`IntNode`]: integer-valued expressions
//! - [`RegionNode`]: region-valued expressions
//!
//! Every node owns its children, so a tree has no sharing and no cycles.
//! Nodes never hold game state; the game and the current assignment reach
//! them through the [`EvalContext`] passed to `eval`.
//!
//! # Traversal contract
//!
//! Besides evaluation, every node takes part in the static analysis passes:
//!
//! | pass | result | fold |
//! |---|---|---|
//! | `game_flags` | [`GameFlags`] | union |
//! | `concepts` | [`ConceptSet`] | union |
//! | `reads_context` / `writes_context` | [`ContextFieldSet`] | union |
//! | `preprocess` | cached node state | children first |
//! | `missing_requirement` | `bool` | or |
//! | `will_crash` | `bool` | or |
//!
//! Each variant only declares its own contribution and its fixed list of
//! typed children through [`Ludeme`]; the folds are written once, on
//! [`NodeRef`] and [`NodeMut`]. A composite's aggregate is therefore always
//! the union of its children's aggregates plus its own tags.
//!
//! Nodes that override the hint or the region for some of their children
//! report it through [`Ludeme::scoped_children`], so a context read can be
//! matched against the writes of its ancestors with
//! [`NodeRef::visit_scoped`].

pub mod boolean;
pub mod int;
pub mod region;

use std::fmt;

use ludeme_foundation::{ConceptSet, ContextFieldSet, GameFlags};

use crate::context::EvalContext;
use crate::error::Result;
use crate::game::Game;
use crate::region::Region;

pub use boolean::{BooleanNode, CompareOp};
pub use int::IntNode;
pub use region::RegionNode;

/// Per-node part of the analysis contract.
///
/// Implementors describe only themselves: what they add to each aggregate,
/// what they require from the game, and which children they own. Every
/// method has an empty default so leaves only override what they use.
pub trait Ludeme: fmt::Display {
    /// Direct children, in a fixed order.
    fn children(&self) -> Vec<NodeRef<'_>> {
        Vec::new()
    }

    /// Direct children, mutably, in the same order as [`Ludeme::children`].
    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        Vec::new()
    }

    fn own_flags(&self, _game: &Game) -> GameFlags {
        GameFlags::empty()
    }

    fn own_concepts(&self, _game: &Game) -> ConceptSet {
        ConceptSet::empty()
    }

    /// Direct children paired with the context fields this node puts in
    /// scope while evaluating them.
    fn scoped_children(&self) -> Vec<(NodeRef<'_>, ContextFieldSet)> {
        unscoped(self.children())
    }

    fn own_reads(&self) -> ContextFieldSet {
        ContextFieldSet::empty()
    }

    fn own_writes(&self) -> ContextFieldSet {
        ContextFieldSet::empty()
    }

    /// One-time caching of derived state. Must be idempotent.
    fn own_preprocess(&mut self, _game: &Game) {}

    /// Why this node cannot run in `game`, if it depends on a capability
    /// the game does not declare.
    fn own_requirement(&self, _game: &Game) -> Option<String> {
        None
    }

    /// Why running this node against `game` would fault, if it would.
    fn own_crash(&self, _game: &Game) -> Option<String> {
        None
    }
}

/// Pair every child with an empty scope.
pub(crate) fn unscoped(children: Vec<NodeRef<'_>>) -> Vec<(NodeRef<'_>, ContextFieldSet)> {
    children
        .into_iter()
        .map(|child| (child, ContextFieldSet::empty()))
        .collect()
}

/// Any node of a rule tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Boolean(BooleanNode),
    Int(IntNode),
    Region(RegionNode),
}

/// Result of evaluating a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Region(Region),
}

/// Borrowed view of a node of any type.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Boolean(&'a BooleanNode),
    Int(&'a IntNode),
    Region(&'a RegionNode),
}

/// Mutable view of a node of any type.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Boolean(&'a mut BooleanNode),
    Int(&'a mut IntNode),
    Region(&'a mut RegionNode),
}

macro_rules! dispatch {
    ($view:ident, $node:expr, $n:ident => $body:expr) => {
        match $node {
            $view::Boolean($n) => $body,
            $view::Int($n) => $body,
            $view::Region($n) => $body,
        }
    };
}

impl<'a> NodeRef<'a> {
    pub fn children(self) -> Vec<NodeRef<'a>> {
        dispatch!(NodeRef, self, n => n.children())
    }

    /// Engine flags required by this subtree.
    pub fn game_flags(self, game: &Game) -> GameFlags {
        self.children()
            .into_iter()
            .fold(dispatch!(NodeRef, self, n => n.own_flags(game)), |acc, c| {
                acc | c.game_flags(game)
            })
    }

    /// Concepts of this subtree.
    pub fn concepts(self, game: &Game) -> ConceptSet {
        self.children()
            .into_iter()
            .fold(dispatch!(NodeRef, self, n => n.own_concepts(game)), |acc, c| {
                acc | c.concepts(game)
            })
    }

    /// Context fields read anywhere in this subtree.
    pub fn reads_context(self) -> ContextFieldSet {
        self.children()
            .into_iter()
            .fold(dispatch!(NodeRef, self, n => n.own_reads()), |acc, c| {
                acc | c.reads_context()
            })
    }

    /// Context fields written anywhere in this subtree.
    pub fn writes_context(self) -> ContextFieldSet {
        self.children()
            .into_iter()
            .fold(dispatch!(NodeRef, self, n => n.own_writes()), |acc, c| {
                acc | c.writes_context()
            })
    }

    pub fn missing_requirement(self, game: &Game) -> bool {
        self.own_requirement(game).is_some()
            || self.children().into_iter().any(|c| c.missing_requirement(game))
    }

    pub fn will_crash(self, game: &Game) -> bool {
        self.own_crash(game).is_some()
            || self.children().into_iter().any(|c| c.will_crash(game))
    }

    pub fn own_requirement(self, game: &Game) -> Option<String> {
        dispatch!(NodeRef, self, n => n.own_requirement(game))
    }

    pub fn own_reads(self) -> ContextFieldSet {
        dispatch!(NodeRef, self, n => n.own_reads())
    }

    pub fn scoped_children(self) -> Vec<(NodeRef<'a>, ContextFieldSet)> {
        dispatch!(NodeRef, self, n => n.scoped_children())
    }

    /// Context fields read in this subtree that no node of the subtree puts
    /// in scope for the reader.
    pub fn unscoped_reads(self) -> ContextFieldSet {
        self.scoped_children()
            .into_iter()
            .fold(self.own_reads(), |acc, (child, scope)| {
                let mut reads = child.unscoped_reads();
                for field in scope.iter() {
                    reads = reads.without(field);
                }
                acc | reads
            })
    }

    pub fn own_crash(self, game: &Game) -> Option<String> {
        dispatch!(NodeRef, self, n => n.own_crash(game))
    }

    /// Visit every node of the subtree, children before parents.
    pub fn visit_post_order(self, f: &mut impl FnMut(NodeRef<'a>)) {
        for child in self.children() {
            child.visit_post_order(f);
        }
        f(self);
    }

    /// Visit every node of the subtree, children before parents, with the
    /// context fields its ancestors put in scope. `scope` is what the caller
    /// provides to the root.
    pub fn visit_scoped(
        self,
        scope: ContextFieldSet,
        f: &mut impl FnMut(NodeRef<'a>, ContextFieldSet),
    ) {
        for (child, provided) in self.scoped_children() {
            child.visit_scoped(scope | provided, f);
        }
        f(self, scope);
    }

    /// Number of nodes in the subtree.
    pub fn size(self) -> usize {
        1 + self.children().into_iter().map(NodeRef::size).sum::<usize>()
    }
}

impl<'a> NodeMut<'a> {
    /// Preprocess the subtree, children first.
    pub fn preprocess(self, game: &Game) {
        dispatch!(NodeMut, self, n => {
            for child in n.children_mut() {
                child.preprocess(game);
            }
            n.own_preprocess(game);
        })
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(NodeRef, self, n => fmt::Display::fmt(n, f))
    }
}

impl<'a> From<&'a BooleanNode> for NodeRef<'a> {
    fn from(node: &'a BooleanNode) -> Self {
        NodeRef::Boolean(node)
    }
}

impl<'a> From<&'a IntNode> for NodeRef<'a> {
    fn from(node: &'a IntNode) -> Self {
        NodeRef::Int(node)
    }
}

impl<'a> From<&'a RegionNode> for NodeRef<'a> {
    fn from(node: &'a RegionNode) -> Self {
        NodeRef::Region(node)
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        dispatch!(Node, node, n => NodeRef::from(n))
    }
}

impl<'a> From<&'a mut Node> for NodeMut<'a> {
    fn from(node: &'a mut Node) -> Self {
        match node {
            Node::Boolean(n) => NodeMut::Boolean(n),
            Node::Int(n) => NodeMut::Int(n),
            Node::Region(n) => NodeMut::Region(n),
        }
    }
}

/// Analysis entry points on an owned node type, delegating to [`NodeRef`].
macro_rules! analysis_methods {
    ($ty:ty, $variant:ident) => {
        impl $ty {
            pub fn game_flags(&self, game: &Game) -> GameFlags {
                NodeRef::$variant(self).game_flags(game)
            }

            pub fn concepts(&self, game: &Game) -> ConceptSet {
                NodeRef::$variant(self).concepts(game)
            }

            pub fn reads_context(&self) -> ContextFieldSet {
                NodeRef::$variant(self).reads_context()
            }

            pub fn writes_context(&self) -> ContextFieldSet {
                NodeRef::$variant(self).writes_context()
            }

            pub fn preprocess(&mut self, game: &Game) {
                NodeMut::$variant(self).preprocess(game)
            }

            pub fn missing_requirement(&self, game: &Game) -> bool {
                NodeRef::$variant(self).missing_requirement(game)
            }

            pub fn will_crash(&self, game: &Game) -> bool {
                NodeRef::$variant(self).will_crash(game)
            }
        }
    };
}

analysis_methods!(BooleanNode, Boolean);
analysis_methods!(IntNode, Int);
analysis_methods!(RegionNode, Region);

impl Node {
    pub fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::from(self)
    }

    pub fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::from(self)
    }

    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> Result<Value> {
        match self {
            Node::Boolean(n) => n.eval(ctx).map(Value::Bool),
            Node::Int(n) => n.eval(ctx).map(Value::Int),
            Node::Region(n) => n.eval(ctx).map(Value::Region),
        }
    }

    pub fn game_flags(&self, game: &Game) -> GameFlags {
        self.node_ref().game_flags(game)
    }

    pub fn concepts(&self, game: &Game) -> ConceptSet {
        self.node_ref().concepts(game)
    }

    pub fn reads_context(&self) -> ContextFieldSet {
        self.node_ref().reads_context()
    }

    pub fn writes_context(&self) -> ContextFieldSet {
        self.node_ref().writes_context()
    }

    pub fn preprocess(&mut self, game: &Game) {
        self.node_mut().preprocess(game)
    }

    pub fn missing_requirement(&self, game: &Game) -> bool {
        self.node_ref().missing_requirement(game)
    }

    pub fn will_crash(&self, game: &Game) -> bool {
        self.node_ref().will_crash(game)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(Node, self, n => fmt::Display::fmt(n, f))
    }
}

impl From<BooleanNode> for Node {
    fn from(node: BooleanNode) -> Self {
        Node::Boolean(node)
    }
}

impl From<IntNode> for Node {
    fn from(node: IntNode) -> Self {
        Node::Int(node)
    }
}

impl From<RegionNode> for Node {
    fn from(node: RegionNode) -> Self {
        Node::Region(node)
    }
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_region(&self) -> Option<&Region> {
        match self {
            Value::Region(r) => Some(r),
            _ => None,
        }
    }
}
