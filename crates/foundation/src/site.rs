//! Graph element kinds of a board.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flags::GameFlag;

/// Which graph element of the board a site index refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SiteType {
    /// Faces of the board (the usual squares of a grid).
    Cell = 0,
    /// Corners shared by adjacent cells.
    Vertex = 1,
    /// Connections between two vertices.
    Edge = 2,
}

impl SiteType {
    /// Total number of site types
    pub const COUNT: usize = 3;

    /// All site types in storage order.
    pub const ALL: [SiteType; Self::COUNT] = [Self::Cell, Self::Vertex, Self::Edge];

    /// Get the site type name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cell => "Cell",
            Self::Vertex => "Vertex",
            Self::Edge => "Edge",
        }
    }

    /// Engine flag raised by any rule that reads sites of this type.
    pub const fn flag(self) -> GameFlag {
        match self {
            Self::Cell => GameFlag::UsesCells,
            Self::Vertex => GameFlag::UsesVertices,
            Self::Edge => GameFlag::UsesEdges,
        }
    }

    /// Dense index, used by per-type storage tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
