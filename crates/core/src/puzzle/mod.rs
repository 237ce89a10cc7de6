//! Deduction-puzzle constraints
//!
//! Constraints over a partial assignment. All of them share one posture:
//! `true` means "no contradiction proven yet", so the same node can be
//! queried after every tentative move as a feasibility filter, and only
//! reports `false` once the resolved sites alone make the constraint
//! impossible to satisfy.
//!
//! - [`IsCount`]: number of sites holding a value in a region
//! - [`IsUnique`]: sub-regions of a static area must differ
//! - [`IsValidDirections`]: edges must point the hinted way

mod count;
mod directions;
mod unique;

pub use count::{CountTarget, IsCount, Tally};
pub use directions::{Direction, IsValidDirections};
pub use unique::IsUnique;

use std::fmt::Display;

use ludeme_foundation::SiteType;

use crate::game::Game;

/// Constraints are only defined for single-player puzzles.
fn single_player_crash(node: &impl Display, game: &Game) -> Option<String> {
    (game.players != 1).then(|| {
        format!(
            "the ludeme {node} is used but {} has {} players instead of 1",
            game.name, game.players
        )
    })
}

fn puzzle_mode_requirement(node: &impl Display, game: &Game) -> Option<String> {
    (!game.is_deduction_puzzle()).then(|| {
        format!(
            "{node} needs a deduction puzzle but {} is played in {:?} mode",
            game.name, game.mode
        )
    })
}

/// A non-empty region name must match at least one declared region.
fn named_region_requirement(name: &str, site_type: SiteType, game: &Game) -> Option<String> {
    if !name.is_empty() && game.matching_regions(name).next().is_none() {
        return Some(format!("no region of {} matches '{}'", game.name, name));
    }
    game.region_issue(name, site_type)
}
