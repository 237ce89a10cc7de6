//! Game descriptor
//!
//! The compiled, read-only description of a game that rule nodes consult:
//! board topology, declared regions and hint tables, player count and play
//! mode. Rule nodes read it during static analysis and during evaluation but
//! never mutate it.
//!
//! The descriptor is produced by the external loader. It can also be read
//! from JSON, which is how fixtures are written:
//!
//! ```
//! # use ludeme_core::game::*;
//! let game = Game::from_json(r#"{
//!     "name": "Mini Sudoku",
//!     "board": { "rows": 4, "columns": 4 },
//!     "regions": [ { "name": "AllRegions", "areas": ["Rows", "Columns", "SubGrids"] } ]
//! }"#).unwrap();
//! assert!(game.is_deduction_puzzle());
//! assert_eq!(game.players, 1);
//! ```

use serde::{Deserialize, Serialize};

use ludeme_foundation::SiteType;

use crate::error::Result;
use crate::region::Region;

/// How the game is played.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// One player filling in a constrained assignment
    #[default]
    DeductionPuzzle,
    /// Players take turns
    Alternating,
    /// Players move at the same time
    Simultaneous,
}

/// Compiled game description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    #[serde(default = "default_players")]
    pub players: u32,
    #[serde(default)]
    pub mode: Mode,
    pub board: Board,
    /// Named regions, in declaration order
    #[serde(default)]
    pub regions: Vec<RegionDecl>,
    #[serde(default)]
    pub hints: Hints,
}

fn default_players() -> u32 {
    1
}

/// Rectangular board with an optional edge topology.
///
/// Cells are numbered row-major over `rows x columns`, vertices row-major
/// over `(rows + 1) x (columns + 1)`. Edges are listed explicitly as vertex
/// pairs; edge `i` is site `i` of [`SiteType::Edge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub rows: usize,
    pub columns: usize,
    #[serde(default = "default_site")]
    pub default_site: SiteType,
    #[serde(default)]
    pub edges: Vec<[usize; 2]>,
}

fn default_site() -> SiteType {
    SiteType::Cell
}

/// Named area of the board.
///
/// A region either lists its sites explicitly or is made of static areas,
/// each of which partitions the board into disjoint sub-regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDecl {
    pub name: String,
    #[serde(default)]
    pub sites: Option<Vec<usize>>,
    #[serde(default)]
    pub areas: Vec<StaticArea>,
}

/// Predefined partition of a board grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum StaticArea {
    /// One sub-region per row
    Rows,
    /// One sub-region per column
    Columns,
    /// Square blocks of side `sqrt(rows) x sqrt(columns)`
    SubGrids,
    /// A single sub-region holding every site
    AllSites,
}

/// Hint tables, one per site type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hints {
    #[serde(default)]
    pub cells: Vec<HintEntry>,
    #[serde(default)]
    pub vertices: Vec<HintEntry>,
    #[serde(default)]
    pub edges: Vec<HintEntry>,
}

/// Hint for one region, indexed by the region's ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintEntry {
    /// Sites the hint applies to
    #[serde(default)]
    pub sites: Vec<usize>,
    /// Expected values, positionally aligned
    pub values: Vec<i32>,
}

impl Game {
    /// Create a single-player deduction puzzle on `board`.
    pub fn puzzle(name: impl Into<String>, board: Board) -> Self {
        Self {
            name: name.into(),
            players: 1,
            mode: Mode::DeductionPuzzle,
            board,
            regions: Vec::new(),
            hints: Hints::default(),
        }
    }

    /// Parse a game description from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_region(mut self, region: RegionDecl) -> Self {
        self.regions.push(region);
        self
    }

    pub fn with_hints(mut self, hints: Hints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_players(mut self, players: u32) -> Self {
        self.players = players;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_deduction_puzzle(&self) -> bool {
        self.mode == Mode::DeductionPuzzle
    }

    /// Look up a region by exact name.
    pub fn region(&self, name: &str) -> Option<&RegionDecl> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Regions whose name contains `fragment`; an empty fragment matches all.
    pub fn matching_regions<'g>(
        &'g self,
        fragment: &'g str,
    ) -> impl Iterator<Item = &'g RegionDecl> + 'g {
        self.regions.iter().filter(move |r| r.name.contains(fragment))
    }

    /// Why the regions matching `fragment` cannot be used with `site_type`,
    /// if they cannot.
    pub fn region_issue(&self, fragment: &str, site_type: SiteType) -> Option<String> {
        self.matching_regions(fragment)
            .find_map(|region| region.issue(&self.board, site_type))
    }
}

impl Board {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            default_site: SiteType::Cell,
            edges: Vec::new(),
        }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn with_default_site(mut self, site_type: SiteType) -> Self {
        self.default_site = site_type;
        self
    }

    /// Add every horizontal then every vertical edge of the vertex grid.
    pub fn with_grid_edges(mut self) -> Self {
        let width = self.columns + 1;
        for r in 0..=self.rows {
            for c in 0..self.columns {
                self.edges.push([r * width + c, r * width + c + 1]);
            }
        }
        for r in 0..self.rows {
            for c in 0..=self.columns {
                self.edges.push([r * width + c, (r + 1) * width + c]);
            }
        }
        self
    }

    /// Number of sites of the given type.
    pub fn num_sites(&self, site_type: SiteType) -> usize {
        match site_type {
            SiteType::Cell => self.rows * self.columns,
            SiteType::Vertex => (self.rows + 1) * (self.columns + 1),
            SiteType::Edge => self.edges.len(),
        }
    }

    /// Height and width of the grid formed by sites of this type.
    fn grid_dims(&self, site_type: SiteType) -> Option<(usize, usize)> {
        match site_type {
            SiteType::Cell => Some((self.rows, self.columns)),
            SiteType::Vertex => Some((self.rows + 1, self.columns + 1)),
            SiteType::Edge => None,
        }
    }
}

impl StaticArea {
    /// Split the grid of `site_type` into disjoint sub-regions.
    ///
    /// Returns `None` when the board shape does not support this area.
    /// Grid areas over the edge topology yield no sub-regions.
    pub fn partition(self, board: &Board, site_type: SiteType) -> Option<Vec<Region>> {
        let grid = board
            .grid_dims(site_type)
            .filter(|&(height, width)| height > 0 && width > 0);

        match (self, grid) {
            (StaticArea::AllSites, _) => {
                Some(vec![(0..board.num_sites(site_type)).collect()])
            }
            (_, None) => Some(Vec::new()),
            (StaticArea::Rows, Some((height, width))) => Some(
                (0..height)
                    .map(|r| (r * width..(r + 1) * width).collect())
                    .collect(),
            ),
            (StaticArea::Columns, Some((height, width))) => Some(
                (0..width)
                    .map(|c| (0..height).map(|r| r * width + c).collect())
                    .collect(),
            ),
            (StaticArea::SubGrids, Some((height, width))) => {
                let block_h = integer_sqrt(height);
                let block_w = integer_sqrt(width);
                if block_h * block_h != height || block_w * block_w != width {
                    return None;
                }
                let mut blocks = Vec::with_capacity(block_h * block_w);
                for br in 0..height / block_h {
                    for bc in 0..width / block_w {
                        let block = (0..block_h)
                            .flat_map(|r| {
                                (0..block_w).map(move |c| {
                                    (br * block_h + r) * width + bc * block_w + c
                                })
                            })
                            .collect();
                        blocks.push(block);
                    }
                }
                Some(blocks)
            }
        }
    }
}

fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

impl RegionDecl {
    pub fn with_sites(name: impl Into<String>, sites: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            sites: Some(sites),
            areas: Vec::new(),
        }
    }

    pub fn with_areas(name: impl Into<String>, areas: Vec<StaticArea>) -> Self {
        Self {
            name: name.into(),
            sites: None,
            areas,
        }
    }

    pub fn has_areas(&self) -> bool {
        !self.areas.is_empty()
    }

    /// Every site covered by this region.
    pub fn all_sites(&self, board: &Board, site_type: SiteType) -> Region {
        if let Some(sites) = &self.sites {
            return Region::unique(sites);
        }
        let mut region = Region::empty();
        for area in &self.areas {
            for sub in area.partition(board, site_type).unwrap_or_default() {
                region.extend_unique(&sub);
            }
        }
        region
    }

    /// Why this region cannot be used with `site_type` on `board`, if it
    /// cannot.
    pub fn issue(&self, board: &Board, site_type: SiteType) -> Option<String> {
        let len = board.num_sites(site_type);
        if let Some(site) = self
            .sites
            .iter()
            .flatten()
            .find(|&&site| site >= len)
        {
            return Some(format!(
                "region '{}' lists {} site {} but the board has {} {} sites",
                self.name, site_type, site, len, site_type
            ));
        }
        self.areas
            .iter()
            .find(|area| area.partition(board, site_type).is_none())
            .map(|area| {
                format!(
                    "region '{}' uses {:?}, which a {}x{} board cannot partition",
                    self.name, area, board.rows, board.columns
                )
            })
    }
}

impl Hints {
    /// The hint table for a site type.
    pub fn for_type(&self, site_type: SiteType) -> &[HintEntry] {
        match site_type {
            SiteType::Cell => &self.cells,
            SiteType::Vertex => &self.vertices,
            SiteType::Edge => &self.edges,
        }
    }

    /// The entry whose sites are exactly `sites`, in any order.
    pub fn matching(&self, site_type: SiteType, sites: &[usize]) -> Option<&HintEntry> {
        self.for_type(site_type).iter().find(|entry| {
            entry.sites.len() == sites.len() && sites.iter().all(|s| entry.sites.contains(s))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.vertices.is_empty() && self.edges.is_empty()
    }
}

impl HintEntry {
    pub fn new(sites: Vec<usize>, values: Vec<i32>) -> Self {
        Self { sites, values }
    }
}
