//! Site assignment storage
//!
//! Holds, for every site of every graph element type, the value assigned to
//! it and whether that value is resolved (committed) or still undetermined.
//! Constraint nodes query it once per site per evaluation, so both queries
//! are direct indexed lookups.

use ludeme_foundation::SiteType;

use crate::error::{Error, Result};
use crate::game::Board;

/// Assignment of one site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteState {
    /// Assigned value; only meaningful when resolved
    pub value: i32,
    /// Whether `value` is a committed final assignment
    pub resolved: bool,
}

/// Per-game-instance assignment storage, indexed by site type then site.
///
/// Cloning a store is how independent search workers get their own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateStore {
    zones: [Vec<SiteState>; SiteType::COUNT],
}

impl StateStore {
    /// Create a store with every site of `board` unresolved.
    pub fn new(board: &Board) -> Self {
        Self::with_sizes(
            board.num_sites(SiteType::Cell),
            board.num_sites(SiteType::Vertex),
            board.num_sites(SiteType::Edge),
        )
    }

    pub fn with_sizes(cells: usize, vertices: usize, edges: usize) -> Self {
        Self {
            zones: [
                vec![SiteState::default(); cells],
                vec![SiteState::default(); vertices],
                vec![SiteState::default(); edges],
            ],
        }
    }

    /// Number of sites of a type.
    pub fn len(&self, site_type: SiteType) -> usize {
        self.zones[site_type.index()].len()
    }

    /// Whether the site holds a committed value. Sites outside the board
    /// are never resolved.
    pub fn is_resolved(&self, site: usize, site_type: SiteType) -> bool {
        self.zones[site_type.index()]
            .get(site)
            .is_some_and(|s| s.resolved)
    }

    /// The value assigned to a site, `0` outside the board.
    pub fn what(&self, site: usize, site_type: SiteType) -> i32 {
        self.zones[site_type.index()]
            .get(site)
            .map_or(0, |s| s.value)
    }

    pub fn get(&self, site: usize, site_type: SiteType) -> Option<SiteState> {
        self.zones[site_type.index()].get(site).copied()
    }

    /// Commit a value to a site.
    pub fn resolve(&mut self, site: usize, site_type: SiteType, value: i32) -> Result<()> {
        *self.slot(site, site_type)? = SiteState {
            value,
            resolved: true,
        };
        Ok(())
    }

    /// Return a site to the undetermined state, keeping its last value.
    pub fn unresolve(&mut self, site: usize, site_type: SiteType) -> Result<()> {
        self.slot(site, site_type)?.resolved = false;
        Ok(())
    }

    /// Record a tentative value without committing it.
    pub fn set_value(&mut self, site: usize, site_type: SiteType, value: i32) -> Result<()> {
        self.slot(site, site_type)?.value = value;
        Ok(())
    }

    /// Number of resolved sites of a type.
    pub fn resolved_count(&self, site_type: SiteType) -> usize {
        self.zones[site_type.index()]
            .iter()
            .filter(|s| s.resolved)
            .count()
    }

    /// Unresolve every site.
    pub fn reset(&mut self) {
        for zone in &mut self.zones {
            zone.fill(SiteState::default());
        }
    }

    fn slot(&mut self, site: usize, site_type: SiteType) -> Result<&mut SiteState> {
        let zone = &mut self.zones[site_type.index()];
        let len = zone.len();
        zone.get_mut(site).ok_or(Error::SiteOutOfRange {
            site,
            site_type,
            len,
        })
    }
}
