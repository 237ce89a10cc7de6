//! Region-valued nodes.

use std::fmt;

use ludeme_foundation::{Concept, ConceptSet, ContextField, ContextFieldSet, GameFlags, SiteType};

use super::boolean::write_list;
use super::{Ludeme, NodeMut, NodeRef};
use crate::context::EvalContext;
use crate::error::{Error, Result};
use crate::game::Game;
use crate::region::Region;

/// Region expression.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionNode {
    /// Fixed list of sites; repeats count once
    Sites(Vec<usize>),
    /// Every site of the declared region with exactly this name
    Named {
        name: String,
        site_type: Option<SiteType>,
    },
    /// The region override in scope
    Current,
    /// Sites of every operand, first occurrence order
    Union(Vec<RegionNode>),
}

impl RegionNode {
    pub fn named(name: impl Into<String>) -> Self {
        RegionNode::Named {
            name: name.into(),
            site_type: None,
        }
    }

    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> Result<Region> {
        match self {
            RegionNode::Sites(sites) => Ok(Region::unique(sites)),
            RegionNode::Named { name, site_type } => {
                let game = ctx.game();
                let decl = game
                    .region(name)
                    .ok_or_else(|| Error::UnknownRegion(name.clone()))?;
                Ok(decl.all_sites(&game.board, site_type.unwrap_or(game.board.default_site)))
            }
            RegionNode::Current => ctx
                .region()
                .cloned()
                .ok_or_else(|| Error::unsupported(self, "no region override in scope")),
            RegionNode::Union(operands) => {
                let mut region = Region::empty();
                for operand in operands {
                    region.extend_unique(&operand.eval(ctx)?);
                }
                Ok(region)
            }
        }
    }
}

impl Ludeme for RegionNode {
    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            RegionNode::Union(operands) => operands.iter().map(NodeRef::Region).collect(),
            _ => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        match self {
            RegionNode::Union(operands) => operands.iter_mut().map(NodeMut::Region).collect(),
            _ => Vec::new(),
        }
    }

    fn own_flags(&self, game: &Game) -> GameFlags {
        match self {
            RegionNode::Named { site_type, .. } => {
                GameFlags::single(site_type.unwrap_or(game.board.default_site).flag())
            }
            _ => GameFlags::empty(),
        }
    }

    fn own_concepts(&self, _game: &Game) -> ConceptSet {
        match self {
            RegionNode::Named { .. } | RegionNode::Current => ConceptSet::single(Concept::Region),
            _ => ConceptSet::empty(),
        }
    }

    fn own_reads(&self) -> ContextFieldSet {
        match self {
            RegionNode::Current => ContextFieldSet::single(ContextField::Region),
            _ => ContextFieldSet::empty(),
        }
    }

    fn own_preprocess(&mut self, game: &Game) {
        if let RegionNode::Named { site_type, .. } = self {
            site_type.get_or_insert(game.board.default_site);
        }
    }

    fn own_requirement(&self, game: &Game) -> Option<String> {
        let RegionNode::Named { name, site_type } = self else {
            return None;
        };
        match game.region(name) {
            None => Some(format!("region '{}' is not declared by {}", name, game.name)),
            Some(decl) => decl.issue(&game.board, site_type.unwrap_or(game.board.default_site)),
        }
    }
}

impl fmt::Display for RegionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionNode::Sites(sites) => {
                write!(f, "(sites {{")?;
                for (i, site) in sites.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{site}")?;
                }
                write!(f, "}})")
            }
            RegionNode::Named { name, .. } => write!(f, "(sites \"{name}\")"),
            RegionNode::Current => write!(f, "(sites Current)"),
            RegionNode::Union(operands) => write_list(f, "union", operands),
        }
    }
}
