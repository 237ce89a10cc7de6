//! Edge direction constraint.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use ludeme_foundation::{Concept, ConceptSet, GameFlag, GameFlags, SiteType};

use crate::ast::Ludeme;
use crate::context::EvalContext;
use crate::error::Result;
use crate::game::{Game, HintEntry};

/// Orientation of an edge, stored as the edge's site value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Direction {
    /// From the first vertex of the edge to the second
    Forward = 1,
    /// From the second vertex of the edge to the first
    Backward = 2,
}

impl Direction {
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Direction::Forward),
            2 => Some(Direction::Backward),
            _ => None,
        }
    }

    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Every resolved edge holds a direction code, and hinted edges point the
/// hinted way.
///
/// An edge hint entry gives either one code for all of its sites or one code
/// per site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsValidDirections;

impl IsValidDirections {
    pub fn new() -> Self {
        Self
    }

    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> Result<bool> {
        let game = ctx.game();
        let state = ctx.state();

        for edge in 0..state.len(SiteType::Edge) {
            if !state.is_resolved(edge, SiteType::Edge) {
                continue;
            }
            let code = state.what(edge, SiteType::Edge);
            if Direction::from_code(code).is_none() {
                trace!(edge, code, "edge value is not a direction");
                return Ok(false);
            }
        }

        for entry in &game.hints.edges {
            for (i, &edge) in entry.sites.iter().enumerate() {
                if !state.is_resolved(edge, SiteType::Edge) {
                    continue;
                }
                let Some(expected) = hinted_code(entry, i) else {
                    continue;
                };
                let code = state.what(edge, SiteType::Edge);
                if code != expected {
                    trace!(edge, code, expected, "edge points against its hint");
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

fn hinted_code(entry: &HintEntry, index: usize) -> Option<i32> {
    match entry.values.as_slice() {
        [single] => Some(*single),
        values => values.get(index).copied(),
    }
}

impl Ludeme for IsValidDirections {
    fn own_flags(&self, _game: &Game) -> GameFlags {
        GameFlags::single(GameFlag::DeductionPuzzle)
            .with(GameFlag::UsesEdges)
            .with(GameFlag::UsesHints)
    }

    fn own_concepts(&self, _game: &Game) -> ConceptSet {
        ConceptSet::single(Concept::DeductionPuzzle)
            .with(Concept::DirectionConstraint)
            .with(Concept::Hints)
    }

    fn own_requirement(&self, game: &Game) -> Option<String> {
        if let Some(reason) = super::puzzle_mode_requirement(self, game) {
            return Some(reason);
        }
        let edges = game.board.num_sites(SiteType::Edge);
        if edges == 0 {
            return Some(format!("{self} needs edges but the board of {} has none", game.name));
        }
        for (ordinal, entry) in game.hints.edges.iter().enumerate() {
            if let Some(site) = entry.sites.iter().find(|&&site| site >= edges) {
                return Some(format!(
                    "edge hint {ordinal} names edge {site} but the board has {edges} edges"
                ));
            }
            if entry.values.len() != 1 && entry.values.len() != entry.sites.len() {
                return Some(format!(
                    "edge hint {ordinal} has {} values for {} edges",
                    entry.values.len(),
                    entry.sites.len()
                ));
            }
            if let Some(code) = entry
                .values
                .iter()
                .find(|&&code| Direction::from_code(code).is_none())
            {
                return Some(format!("edge hint {ordinal} holds {code}, not a direction"));
            }
        }
        None
    }

    fn own_crash(&self, game: &Game) -> Option<String> {
        super::single_player_crash(self, game)
    }
}

impl fmt::Display for IsValidDirections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(is ValidDirections)")
    }
}
