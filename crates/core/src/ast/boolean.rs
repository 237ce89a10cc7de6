//! Boolean-valued nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use ludeme_foundation::{Concept, ConceptSet, ContextField, ContextFieldSet, GameFlags, SiteType};

use super::{unscoped, IntNode, Ludeme, NodeMut, NodeRef};
use crate::context::EvalContext;
use crate::error::{Error, Result};
use crate::game::Game;
use crate::puzzle::{IsCount, IsUnique, IsValidDirections};

/// Predicate over the current position.
///
/// Puzzle constraints answer "no contradiction proven yet" rather than
/// "fully satisfied", so a `true` from a partially assigned position only
/// means search may continue from it.
#[derive(Debug, Clone, PartialEq)]
pub enum BooleanNode {
    Constant(bool),
    Not(Box<BooleanNode>),
    /// Short-circuits on the first `false`
    And(Vec<BooleanNode>),
    /// Short-circuits on the first `true`
    Or(Vec<BooleanNode>),
    Compare {
        op: CompareOp,
        lhs: Box<IntNode>,
        rhs: Box<IntNode>,
    },
    /// Evaluate `body` once per sub-region of every declared region whose
    /// name contains `name`, with the region override (and the sub-region's
    /// hint, if the game declares one) in scope. `false` as soon as one
    /// sub-region fails. A body that reads the hint skips sub-regions the
    /// game gives no hint.
    ForEachRegion {
        name: String,
        site_type: Option<SiteType>,
        body: Box<BooleanNode>,
    },
    Count(IsCount),
    Unique(IsUnique),
    ValidDirections(IsValidDirections),
}

/// Integer comparison operator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn apply(self, lhs: i32, rhs: i32) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl BooleanNode {
    pub fn not(node: BooleanNode) -> Self {
        BooleanNode::Not(Box::new(node))
    }

    pub fn compare(op: CompareOp, lhs: IntNode, rhs: IntNode) -> Self {
        BooleanNode::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn for_each_region(name: impl Into<String>, body: BooleanNode) -> Self {
        BooleanNode::ForEachRegion {
            name: name.into(),
            site_type: None,
            body: Box::new(body),
        }
    }

    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> Result<bool> {
        match self {
            BooleanNode::Constant(value) => Ok(*value),
            BooleanNode::Not(inner) => Ok(!inner.eval(ctx)?),
            BooleanNode::And(nodes) => {
                for node in nodes {
                    if !node.eval(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            BooleanNode::Or(nodes) => {
                for node in nodes {
                    if node.eval(ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            BooleanNode::Compare { op, lhs, rhs } => {
                let lhs = lhs.eval(ctx)?;
                let rhs = rhs.eval(ctx)?;
                Ok(op.apply(lhs, rhs))
            }
            BooleanNode::ForEachRegion {
                name,
                site_type,
                body,
            } => self.eval_for_each_region(ctx, name, *site_type, body),
            BooleanNode::Count(count) => count.eval(ctx),
            BooleanNode::Unique(unique) => unique.eval(ctx),
            BooleanNode::ValidDirections(directions) => directions.eval(ctx),
        }
    }

    fn eval_for_each_region(
        &self,
        ctx: &mut EvalContext<'_>,
        name: &str,
        site_type: Option<SiteType>,
        body: &BooleanNode,
    ) -> Result<bool> {
        let game = ctx.game();
        let site_type = site_type.unwrap_or(game.board.default_site);
        let hints = game.hints.for_type(site_type);
        let needs_hint = NodeRef::Boolean(body)
            .unscoped_reads()
            .contains(ContextField::Hint);

        for decl in game.matching_regions(name) {
            if !decl.has_areas() {
                let region = decl.all_sites(&game.board, site_type);
                let hint = game
                    .hints
                    .matching(site_type, region.sites())
                    .map(|entry| entry.values.clone());
                if needs_hint && hint.is_none() {
                    continue;
                }
                let mut in_region = ctx.scope_region(Some(region));
                let mut scoped = in_region.scope_hint(hint);
                if !body.eval(&mut scoped)? {
                    return Ok(false);
                }
                continue;
            }

            for area in &decl.areas {
                let subs = area.partition(&game.board, site_type).ok_or_else(|| {
                    Error::unsupported(self, format!("{area:?} cannot partition the board"))
                })?;
                for (ordinal, sub) in subs.into_iter().enumerate() {
                    let hint = hints.get(ordinal).map(|entry| entry.values.clone());
                    if needs_hint && hint.is_none() {
                        continue;
                    }
                    let mut in_region = ctx.scope_region(Some(sub));
                    let mut scoped = in_region.scope_hint(hint);
                    if !body.eval(&mut scoped)? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }
}

impl Ludeme for BooleanNode {
    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            BooleanNode::Constant(_) => Vec::new(),
            BooleanNode::Not(inner) => vec![NodeRef::Boolean(inner)],
            BooleanNode::And(nodes) | BooleanNode::Or(nodes) => {
                nodes.iter().map(NodeRef::Boolean).collect()
            }
            BooleanNode::Compare { lhs, rhs, .. } => vec![NodeRef::Int(lhs), NodeRef::Int(rhs)],
            BooleanNode::ForEachRegion { body, .. } => vec![NodeRef::Boolean(body)],
            BooleanNode::Count(count) => count.children(),
            BooleanNode::Unique(unique) => unique.children(),
            BooleanNode::ValidDirections(directions) => directions.children(),
        }
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        match self {
            BooleanNode::Constant(_) => Vec::new(),
            BooleanNode::Not(inner) => vec![NodeMut::Boolean(inner)],
            BooleanNode::And(nodes) | BooleanNode::Or(nodes) => {
                nodes.iter_mut().map(NodeMut::Boolean).collect()
            }
            BooleanNode::Compare { lhs, rhs, .. } => {
                vec![NodeMut::Int(lhs), NodeMut::Int(rhs)]
            }
            BooleanNode::ForEachRegion { body, .. } => vec![NodeMut::Boolean(body)],
            BooleanNode::Count(count) => count.children_mut(),
            BooleanNode::Unique(unique) => unique.children_mut(),
            BooleanNode::ValidDirections(directions) => directions.children_mut(),
        }
    }

    fn scoped_children(&self) -> Vec<(NodeRef<'_>, ContextFieldSet)> {
        match self {
            BooleanNode::ForEachRegion { body, .. } => vec![(
                NodeRef::Boolean(body),
                ContextFieldSet::single(ContextField::Region).with(ContextField::Hint),
            )],
            BooleanNode::Count(count) => count.scoped_children(),
            _ => unscoped(self.children()),
        }
    }

    fn own_flags(&self, game: &Game) -> GameFlags {
        match self {
            BooleanNode::ForEachRegion { site_type, .. } => {
                GameFlags::single(site_type.unwrap_or(game.board.default_site).flag())
            }
            BooleanNode::Count(count) => count.own_flags(game),
            BooleanNode::Unique(unique) => unique.own_flags(game),
            BooleanNode::ValidDirections(directions) => directions.own_flags(game),
            _ => GameFlags::empty(),
        }
    }

    fn own_concepts(&self, game: &Game) -> ConceptSet {
        match self {
            BooleanNode::Constant(_) => ConceptSet::empty(),
            BooleanNode::Not(_) => ConceptSet::single(Concept::Negation),
            BooleanNode::And(_) => ConceptSet::single(Concept::Conjunction),
            BooleanNode::Or(_) => ConceptSet::single(Concept::Disjunction),
            BooleanNode::Compare { .. } => ConceptSet::single(Concept::Comparison),
            BooleanNode::ForEachRegion { .. } => ConceptSet::single(Concept::Region)
                .with(Concept::StaticRegion),
            BooleanNode::Count(count) => count.own_concepts(game),
            BooleanNode::Unique(unique) => unique.own_concepts(game),
            BooleanNode::ValidDirections(directions) => directions.own_concepts(game),
        }
    }

    fn own_reads(&self) -> ContextFieldSet {
        match self {
            BooleanNode::Count(count) => count.own_reads(),
            BooleanNode::Unique(unique) => unique.own_reads(),
            BooleanNode::ValidDirections(directions) => directions.own_reads(),
            _ => ContextFieldSet::empty(),
        }
    }

    fn own_writes(&self) -> ContextFieldSet {
        match self {
            BooleanNode::ForEachRegion { .. } => ContextFieldSet::single(ContextField::Region)
                .with(ContextField::Hint),
            BooleanNode::Count(count) => count.own_writes(),
            BooleanNode::Unique(unique) => unique.own_writes(),
            BooleanNode::ValidDirections(directions) => directions.own_writes(),
            _ => ContextFieldSet::empty(),
        }
    }

    fn own_preprocess(&mut self, game: &Game) {
        match self {
            BooleanNode::ForEachRegion { site_type, .. } => {
                site_type.get_or_insert(game.board.default_site);
            }
            BooleanNode::Count(count) => count.own_preprocess(game),
            BooleanNode::Unique(unique) => unique.own_preprocess(game),
            BooleanNode::ValidDirections(directions) => directions.own_preprocess(game),
            _ => {}
        }
    }

    fn own_requirement(&self, game: &Game) -> Option<String> {
        match self {
            BooleanNode::ForEachRegion {
                name, site_type, ..
            } => {
                if game.matching_regions(name).next().is_none() {
                    return Some(format!("no region of {} matches '{}'", game.name, name));
                }
                game.region_issue(name, site_type.unwrap_or(game.board.default_site))
            }
            BooleanNode::Count(count) => count.own_requirement(game),
            BooleanNode::Unique(unique) => unique.own_requirement(game),
            BooleanNode::ValidDirections(directions) => directions.own_requirement(game),
            _ => None,
        }
    }

    fn own_crash(&self, game: &Game) -> Option<String> {
        match self {
            BooleanNode::Count(count) => count.own_crash(game),
            BooleanNode::Unique(unique) => unique.own_crash(game),
            BooleanNode::ValidDirections(directions) => directions.own_crash(game),
            _ => None,
        }
    }
}

impl fmt::Display for BooleanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanNode::Constant(value) => write!(f, "{value}"),
            BooleanNode::Not(inner) => write!(f, "(not {inner})"),
            BooleanNode::And(nodes) => write_list(f, "and", nodes),
            BooleanNode::Or(nodes) => write_list(f, "or", nodes),
            BooleanNode::Compare { op, lhs, rhs } => write!(f, "({} {lhs} {rhs})", op.symbol()),
            BooleanNode::ForEachRegion { name, body, .. } => {
                write!(f, "(forEach Region \"{name}\" {body})")
            }
            BooleanNode::Count(count) => write!(f, "{count}"),
            BooleanNode::Unique(unique) => write!(f, "{unique}"),
            BooleanNode::ValidDirections(directions) => write!(f, "{directions}"),
        }
    }
}

pub(crate) fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    head: &str,
    items: &[T],
) -> fmt::Result {
    write!(f, "({head}")?;
    for item in items {
        write!(f, " {item}")?;
    }
    write!(f, ")")
}

impl From<IsCount> for BooleanNode {
    fn from(count: IsCount) -> Self {
        BooleanNode::Count(count)
    }
}

impl From<IsUnique> for BooleanNode {
    fn from(unique: IsUnique) -> Self {
        BooleanNode::Unique(unique)
    }
}

impl From<IsValidDirections> for BooleanNode {
    fn from(directions: IsValidDirections) -> Self {
        BooleanNode::ValidDirections(directions)
    }
}
