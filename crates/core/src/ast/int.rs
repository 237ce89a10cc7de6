//! Integer-valued nodes.

use std::fmt;

use ludeme_foundation::{
    Concept, ConceptSet, ContextField, ContextFieldSet, GameFlag, GameFlags, SiteType,
};

use super::boolean::write_list;
use super::{Ludeme, NodeMut, NodeRef, RegionNode};
use crate::context::EvalContext;
use crate::error::{Error, Result};
use crate::game::Game;

/// Integer expression.
#[derive(Debug, Clone, PartialEq)]
pub enum IntNode {
    Constant(i32),
    /// Entry of the hint vector in scope
    Hint { position: usize },
    /// Value assigned to a site; `0` while the site is unresolved
    SiteValue {
        site: usize,
        site_type: Option<SiteType>,
    },
    /// Number of sites of a region
    Size(Box<RegionNode>),
    Add(Vec<IntNode>),
    Mul(Vec<IntNode>),
    Neg(Box<IntNode>),
}

impl IntNode {
    pub fn site_value(site: usize) -> Self {
        IntNode::SiteValue {
            site,
            site_type: None,
        }
    }

    pub fn size(region: RegionNode) -> Self {
        IntNode::Size(Box::new(region))
    }

    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> Result<i32> {
        match self {
            IntNode::Constant(value) => Ok(*value),
            IntNode::Hint { position } => ctx.hint_value(*position),
            IntNode::SiteValue { site, site_type } => {
                let site_type = site_type.unwrap_or(ctx.game().board.default_site);
                let state = ctx.state();
                Ok(if state.is_resolved(*site, site_type) {
                    state.what(*site, site_type)
                } else {
                    0
                })
            }
            IntNode::Size(region) => {
                let len = region.eval(ctx)?.len();
                i32::try_from(len)
                    .map_err(|_| Error::unsupported(self, format!("region of {len} sites")))
            }
            IntNode::Add(terms) => terms.iter().try_fold(0i32, |acc, term| {
                acc.checked_add(term.eval(ctx)?)
                    .ok_or_else(|| Error::unsupported(self, "integer overflow"))
            }),
            IntNode::Mul(factors) => factors.iter().try_fold(1i32, |acc, factor| {
                acc.checked_mul(factor.eval(ctx)?)
                    .ok_or_else(|| Error::unsupported(self, "integer overflow"))
            }),
            IntNode::Neg(inner) => inner
                .eval(ctx)?
                .checked_neg()
                .ok_or_else(|| Error::unsupported(self, "integer overflow")),
        }
    }

    /// Whether evaluating this subtree consults the hint vector.
    pub fn reads_hint(&self) -> bool {
        self.reads_context().contains(ContextField::Hint)
    }
}

impl Ludeme for IntNode {
    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            IntNode::Constant(_) | IntNode::Hint { .. } | IntNode::SiteValue { .. } => Vec::new(),
            IntNode::Size(region) => vec![NodeRef::Region(region)],
            IntNode::Add(nodes) | IntNode::Mul(nodes) => nodes.iter().map(NodeRef::Int).collect(),
            IntNode::Neg(inner) => vec![NodeRef::Int(inner)],
        }
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        match self {
            IntNode::Constant(_) | IntNode::Hint { .. } | IntNode::SiteValue { .. } => Vec::new(),
            IntNode::Size(region) => vec![NodeMut::Region(region)],
            IntNode::Add(nodes) | IntNode::Mul(nodes) => {
                nodes.iter_mut().map(NodeMut::Int).collect()
            }
            IntNode::Neg(inner) => vec![NodeMut::Int(inner)],
        }
    }

    fn own_flags(&self, game: &Game) -> GameFlags {
        match self {
            IntNode::Hint { .. } => GameFlags::single(GameFlag::UsesHints),
            IntNode::SiteValue { site_type, .. } => {
                GameFlags::single(site_type.unwrap_or(game.board.default_site).flag())
            }
            _ => GameFlags::empty(),
        }
    }

    fn own_concepts(&self, _game: &Game) -> ConceptSet {
        match self {
            IntNode::Constant(_) | IntNode::Size(_) => ConceptSet::empty(),
            IntNode::Hint { .. } => ConceptSet::single(Concept::Hints),
            IntNode::SiteValue { .. } => ConceptSet::single(Concept::SiteValue),
            IntNode::Add(_) | IntNode::Mul(_) | IntNode::Neg(_) => {
                ConceptSet::single(Concept::Arithmetic)
            }
        }
    }

    fn own_reads(&self) -> ContextFieldSet {
        match self {
            IntNode::Hint { .. } => ContextFieldSet::single(ContextField::Hint),
            _ => ContextFieldSet::empty(),
        }
    }

    fn own_preprocess(&mut self, game: &Game) {
        if let IntNode::SiteValue { site_type, .. } = self {
            site_type.get_or_insert(game.board.default_site);
        }
    }
}

impl fmt::Display for IntNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntNode::Constant(value) => write!(f, "{value}"),
            IntNode::Hint { position: 0 } => write!(f, "(hint)"),
            IntNode::Hint { position } => write!(f, "(hint {position})"),
            IntNode::SiteValue { site, .. } => write!(f, "(what {site})"),
            IntNode::Size(region) => write!(f, "(size {region})"),
            IntNode::Add(terms) => write_list(f, "+", terms),
            IntNode::Mul(factors) => write_list(f, "*", factors),
            IntNode::Neg(inner) => write!(f, "(- {inner})"),
        }
    }
}
