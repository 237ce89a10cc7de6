//! Regions: ordered sets of site indices.

use serde::{Deserialize, Serialize};

/// A set of site indices, in the order they were produced.
///
/// Regions are either computed by evaluating a region node or produced by
/// partitioning a named area of the board into sub-regions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    sites: Vec<usize>,
}

impl Region {
    pub fn new(sites: Vec<usize>) -> Self {
        Self { sites }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Region of `sites` with repeats dropped, first occurrence kept.
    pub fn unique(sites: &[usize]) -> Self {
        let mut region = Self::empty();
        for &site in sites {
            region.insert(site);
        }
        region
    }

    pub fn sites(&self) -> &[usize] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn contains(&self, site: usize) -> bool {
        self.sites.contains(&site)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.sites.iter().copied()
    }

    /// Append `site` unless already present. Returns whether it was added.
    pub fn insert(&mut self, site: usize) -> bool {
        if self.contains(site) {
            return false;
        }
        self.sites.push(site);
        true
    }

    /// Append the sites of `other` that are not already present.
    pub fn extend_unique(&mut self, other: &Region) {
        for site in other.iter() {
            self.insert(site);
        }
    }
}

impl From<Vec<usize>> for Region {
    fn from(sites: Vec<usize>) -> Self {
        Self::new(sites)
    }
}

impl FromIterator<usize> for Region {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
