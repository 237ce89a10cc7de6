//! Count constraint.

use std::fmt;

use tracing::trace;

use ludeme_foundation::{
    Concept, ConceptSet, ContextField, ContextFieldSet, GameFlag, GameFlags, SiteType,
};

use crate::ast::{unscoped, IntNode, Ludeme, NodeMut, NodeRef, RegionNode};
use crate::context::EvalContext;
use crate::error::Result;
use crate::game::{Game, HintEntry};
use crate::region::Region;
use crate::storage::StateStore;

/// What an [`IsCount`] counts over.
#[derive(Debug, Clone, PartialEq)]
pub enum CountTarget {
    /// A single region expression
    Region(RegionNode),
    /// Every declared region whose name contains this fragment; static areas
    /// are checked sub-region by sub-region
    Named(String),
}

/// The number of sites holding `what` in a region must equal `result`.
///
/// Violated iff the region is fully resolved and the count differs, or the
/// resolved count already exceeds `result`. A region with no sites never
/// violates.
#[derive(Debug, Clone, PartialEq)]
pub struct IsCount {
    target: CountTarget,
    site_type: Option<SiteType>,
    what: Option<IntNode>,
    result: IntNode,
    /// Cached by preprocess: whether `result` reads the hint vector
    result_reads_hint: Option<bool>,
}

/// Resolved-site count of one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub sites: usize,
    pub matches: i32,
    pub unresolved: usize,
}

impl Tally {
    pub fn scan(
        state: &StateStore,
        sites: impl IntoIterator<Item = usize>,
        site_type: SiteType,
        what: i32,
    ) -> Self {
        let mut tally = Tally::default();
        for site in sites {
            tally.sites += 1;
            if !state.is_resolved(site, site_type) {
                tally.unresolved += 1;
            } else if state.what(site, site_type) == what {
                tally.matches += 1;
            }
        }
        tally
    }

    pub fn all_assigned(self) -> bool {
        self.unresolved == 0
    }

    /// Whether the resolved sites alone rule out a count of `result`.
    pub fn violates(self, result: i32) -> bool {
        self.sites > 0
            && ((self.all_assigned() && self.matches != result) || self.matches > result)
    }
}

impl IsCount {
    /// Count over the sites of `region`.
    pub fn in_region(region: RegionNode, result: IntNode) -> Self {
        Self::new(CountTarget::Region(region), result)
    }

    /// Count over every sub-region of the regions whose name contains `name`.
    pub fn in_named(name: impl Into<String>, result: IntNode) -> Self {
        Self::new(CountTarget::Named(name.into()), result)
    }

    fn new(target: CountTarget, result: IntNode) -> Self {
        Self {
            target,
            site_type: None,
            what: None,
            result,
            result_reads_hint: None,
        }
    }

    /// Count sites holding `what` instead of `1`.
    pub fn with_what(mut self, what: IntNode) -> Self {
        self.what = Some(what);
        self
    }

    pub fn with_site_type(mut self, site_type: SiteType) -> Self {
        self.site_type = Some(site_type);
        self
    }

    pub fn target(&self) -> &CountTarget {
        &self.target
    }

    pub fn what(&self) -> Option<&IntNode> {
        self.what.as_ref()
    }

    pub fn result(&self) -> &IntNode {
        &self.result
    }

    pub fn site_type(&self) -> Option<SiteType> {
        self.site_type
    }

    fn is_named(&self) -> bool {
        matches!(self.target, CountTarget::Named(_))
    }

    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> Result<bool> {
        let site_type = self.site_type.unwrap_or(ctx.game().board.default_site);
        let what = match &self.what {
            Some(what) => what.eval(ctx)?,
            None => 1,
        };

        match &self.target {
            CountTarget::Region(region) => {
                let result = self.result.eval(ctx)?;
                let region = region.eval(ctx)?;
                Ok(self.holds(ctx.state(), &region, site_type, what, result))
            }
            CountTarget::Named(name) => self.eval_named(ctx, name, site_type, what),
        }
    }

    fn eval_named(
        &self,
        ctx: &mut EvalContext<'_>,
        name: &str,
        site_type: SiteType,
        what: i32,
    ) -> Result<bool> {
        let game = ctx.game();
        let state = ctx.state();
        let per_region = self
            .result_reads_hint
            .unwrap_or_else(|| self.result.reads_hint());
        let hints = game.hints.for_type(site_type);
        let mut shared = None;

        for decl in game.matching_regions(name) {
            if !decl.has_areas() {
                let region = decl.all_sites(&game.board, site_type);
                let result = if per_region {
                    let entry = game.hints.matching(site_type, region.sites());
                    self.hinted_result(ctx, entry)?
                } else {
                    Some(self.shared_result(ctx, &mut shared)?)
                };
                if let Some(result) = result {
                    if !self.holds(state, &region, site_type, what, result) {
                        return Ok(false);
                    }
                }
                continue;
            }

            for area in &decl.areas {
                // An unpartitionable area is reported by the requirement pass.
                let subs = area.partition(&game.board, site_type).unwrap_or_default();
                for (ordinal, sub) in subs.iter().enumerate() {
                    let result = if per_region {
                        self.hinted_result(ctx, hints.get(ordinal))?
                    } else {
                        Some(self.shared_result(ctx, &mut shared)?)
                    };
                    let Some(result) = result else {
                        continue;
                    };
                    if !self.holds(state, sub, site_type, what, result) {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// Target of one sub-region, with its hint in scope. `None` when the
    /// game gives the sub-region no hint.
    fn hinted_result(
        &self,
        ctx: &mut EvalContext<'_>,
        entry: Option<&HintEntry>,
    ) -> Result<Option<i32>> {
        let Some(entry) = entry else {
            return Ok(None);
        };
        let mut scoped = ctx.scope_hint(Some(entry.values.clone()));
        self.result.eval(&mut scoped).map(Some)
    }

    fn shared_result(&self, ctx: &mut EvalContext<'_>, cache: &mut Option<i32>) -> Result<i32> {
        if let Some(result) = *cache {
            return Ok(result);
        }
        let result = self.result.eval(ctx)?;
        *cache = Some(result);
        Ok(result)
    }

    fn holds(
        &self,
        state: &StateStore,
        region: &Region,
        site_type: SiteType,
        what: i32,
        result: i32,
    ) -> bool {
        let tally = Tally::scan(state, region.iter(), site_type, what);
        if tally.violates(result) {
            trace!(
                node = %self,
                matches = tally.matches,
                unresolved = tally.unresolved,
                result,
                "count violated"
            );
            return false;
        }
        true
    }
}

impl Ludeme for IsCount {
    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children = Vec::with_capacity(3);
        if let CountTarget::Region(region) = &self.target {
            children.push(NodeRef::Region(region));
        }
        if let Some(what) = &self.what {
            children.push(NodeRef::Int(what));
        }
        children.push(NodeRef::Int(&self.result));
        children
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        let mut children = Vec::with_capacity(3);
        if let CountTarget::Region(region) = &mut self.target {
            children.push(NodeMut::Region(region));
        }
        if let Some(what) = &mut self.what {
            children.push(NodeMut::Int(what));
        }
        children.push(NodeMut::Int(&mut self.result));
        children
    }

    fn scoped_children(&self) -> Vec<(NodeRef<'_>, ContextFieldSet)> {
        let provided = self.own_writes();
        let mut children = unscoped(self.children());
        // `result` is always the last child.
        if let Some((_, scope)) = children.last_mut() {
            *scope = provided;
        }
        children
    }

    fn own_flags(&self, game: &Game) -> GameFlags {
        let site_type = self.site_type.unwrap_or(game.board.default_site);
        let flags = GameFlags::single(GameFlag::DeductionPuzzle).with(site_type.flag());
        if self.is_named() {
            flags.with(GameFlag::UsesHints)
        } else {
            flags
        }
    }

    fn own_concepts(&self, _game: &Game) -> ConceptSet {
        let concepts =
            ConceptSet::single(Concept::DeductionPuzzle).with(Concept::CountConstraint);
        if self.is_named() {
            concepts.with(Concept::StaticRegion)
        } else {
            concepts
        }
    }

    fn own_writes(&self) -> ContextFieldSet {
        if self.is_named() {
            ContextFieldSet::single(ContextField::Hint)
        } else {
            ContextFieldSet::empty()
        }
    }

    fn own_preprocess(&mut self, game: &Game) {
        self.site_type.get_or_insert(game.board.default_site);
        self.result_reads_hint = Some(self.result.reads_hint());
    }

    fn own_requirement(&self, game: &Game) -> Option<String> {
        if let Some(reason) = super::puzzle_mode_requirement(self, game) {
            return Some(reason);
        }
        match &self.target {
            CountTarget::Region(_) => None,
            CountTarget::Named(name) => super::named_region_requirement(
                name,
                self.site_type.unwrap_or(game.board.default_site),
                game,
            ),
        }
    }

    fn own_crash(&self, game: &Game) -> Option<String> {
        super::single_player_crash(self, game)
    }
}

impl fmt::Display for IsCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(is Count ")?;
        match &self.target {
            CountTarget::Region(region) => write!(f, "{region}")?,
            CountTarget::Named(name) => write!(f, "\"{name}\"")?,
        }
        if let Some(what) = &self.what {
            write!(f, " {what}")?;
        }
        write!(f, " {})", self.result)
    }
}
