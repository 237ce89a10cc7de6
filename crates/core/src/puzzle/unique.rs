//! Uniqueness of sub-regions.

use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use ludeme_foundation::{Concept, ConceptSet, GameFlag, GameFlags, SiteType};

use crate::ast::Ludeme;
use crate::context::EvalContext;
use crate::error::Result;
use crate::game::Game;
use crate::storage::StateStore;

/// Every sub-region of a static area must hold a different sequence of
/// values from the other sub-regions of the same area.
///
/// Two sub-regions only clash once both are fully resolved, have the same
/// length and agree at every relative position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsUnique {
    /// Fragment of the region names to check; empty checks every region
    name: String,
    site_type: Option<SiteType>,
}

impl IsUnique {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            site_type: None,
        }
    }

    pub fn with_site_type(mut self, site_type: SiteType) -> Self {
        self.site_type = Some(site_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> Result<bool> {
        let game = ctx.game();
        let state = ctx.state();
        let site_type = self.site_type.unwrap_or(game.board.default_site);

        for decl in game.matching_regions(&self.name) {
            for area in &decl.areas {
                let subs = area.partition(&game.board, site_type).unwrap_or_default();
                let mut seen: IndexMap<Vec<i32>, usize> = IndexMap::new();
                for (ordinal, sub) in subs.iter().enumerate() {
                    let Some(values) = resolved_values(state, sub.iter(), site_type) else {
                        continue;
                    };
                    if values.is_empty() {
                        continue;
                    }
                    if let Some(first) = seen.insert(values, ordinal) {
                        trace!(
                            node = %self,
                            region = %decl.name,
                            first,
                            second = ordinal,
                            "identical sub-regions"
                        );
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }
}

/// Values of `sites` in order, or `None` if any of them is unresolved.
fn resolved_values(
    state: &StateStore,
    sites: impl Iterator<Item = usize>,
    site_type: SiteType,
) -> Option<Vec<i32>> {
    sites
        .map(|site| {
            state
                .is_resolved(site, site_type)
                .then(|| state.what(site, site_type))
        })
        .collect()
}

impl Ludeme for IsUnique {
    fn own_flags(&self, game: &Game) -> GameFlags {
        GameFlags::single(GameFlag::DeductionPuzzle)
            .with(self.site_type.unwrap_or(game.board.default_site).flag())
    }

    fn own_concepts(&self, _game: &Game) -> ConceptSet {
        ConceptSet::single(Concept::DeductionPuzzle)
            .with(Concept::UniqueConstraint)
            .with(Concept::StaticRegion)
    }

    fn own_preprocess(&mut self, game: &Game) {
        self.site_type.get_or_insert(game.board.default_site);
    }

    fn own_requirement(&self, game: &Game) -> Option<String> {
        super::puzzle_mode_requirement(self, game).or_else(|| {
            super::named_region_requirement(
                &self.name,
                self.site_type.unwrap_or(game.board.default_site),
                game,
            )
        })
    }

    fn own_crash(&self, game: &Game) -> Option<String> {
        super::single_player_crash(self, game)
    }
}

impl fmt::Display for IsUnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "(is Unique)")
        } else {
            write!(f, "(is Unique \"{}\")", self.name)
        }
    }
}
