//! Aggregation bitsets computed over rule trees.
//!
//! Static analysis folds three independent bitsets over every subtree:
//!
//! - [`GameFlags`]: engine capabilities the subtree requires
//! - [`ConceptSet`]: descriptive tags used for cataloguing
//! - [`ContextFieldSet`]: which evaluation-context fields the subtree reads
//!   or writes
//!
//! Each universe is a small closed enum, so every set is a `Copy` integer
//! with const-fn builders.
//!
//! # Examples
//!
//! ```
//! # use ludeme_foundation::flags::*;
//! let flags = GameFlags::empty()
//!     .with(GameFlag::DeductionPuzzle)
//!     .with(GameFlag::UsesCells);
//! assert!(flags.contains(GameFlag::DeductionPuzzle));
//! assert!(!flags.contains(GameFlag::UsesEdges));
//!
//! let reads = ContextFieldSet::single(ContextField::Hint);
//! assert!(reads.is_subset_of(ContextFieldSet::all()));
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Engine capability a rule subtree imposes on the game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GameFlag {
    /// Single-player constraint-satisfaction game
    DeductionPuzzle = 0,
    /// Reads cell sites
    UsesCells = 1,
    /// Reads vertex sites
    UsesVertices = 2,
    /// Reads edge sites
    UsesEdges = 3,
    /// Reads externally supplied hints
    UsesHints = 4,
}

/// Descriptive tag attached to a rule subtree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Concept {
    DeductionPuzzle = 0,
    /// Number of pieces in a region must match a target
    CountConstraint = 1,
    /// Sub-regions of an area must differ from each other
    UniqueConstraint = 2,
    /// Edges must point the hinted way
    DirectionConstraint = 3,
    Hints = 4,
    Region = 5,
    /// Named area partitioned into sub-regions
    StaticRegion = 6,
    Conjunction = 7,
    Disjunction = 8,
    Negation = 9,
    Comparison = 10,
    Arithmetic = 11,
    SiteValue = 12,
}

/// Field of the evaluation context a node may touch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ContextField {
    /// The hint vector of the region being checked
    Hint = 0,
    /// The region override
    Region = 1,
}

impl GameFlag {
    /// Total number of game flags
    pub const COUNT: usize = 5;

    /// Every flag in bit order.
    pub const ALL: [GameFlag; Self::COUNT] = [
        Self::DeductionPuzzle,
        Self::UsesCells,
        Self::UsesVertices,
        Self::UsesEdges,
        Self::UsesHints,
    ];

    /// Get the flag name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeductionPuzzle => "DeductionPuzzle",
            Self::UsesCells => "UsesCells",
            Self::UsesVertices => "UsesVertices",
            Self::UsesEdges => "UsesEdges",
            Self::UsesHints => "UsesHints",
        }
    }
}

impl Concept {
    /// Total number of concepts
    pub const COUNT: usize = 13;

    /// Every concept in bit order.
    pub const ALL: [Concept; Self::COUNT] = [
        Self::DeductionPuzzle,
        Self::CountConstraint,
        Self::UniqueConstraint,
        Self::DirectionConstraint,
        Self::Hints,
        Self::Region,
        Self::StaticRegion,
        Self::Conjunction,
        Self::Disjunction,
        Self::Negation,
        Self::Comparison,
        Self::Arithmetic,
        Self::SiteValue,
    ];

    /// Get the concept name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeductionPuzzle => "DeductionPuzzle",
            Self::CountConstraint => "CountConstraint",
            Self::UniqueConstraint => "UniqueConstraint",
            Self::DirectionConstraint => "DirectionConstraint",
            Self::Hints => "Hints",
            Self::Region => "Region",
            Self::StaticRegion => "StaticRegion",
            Self::Conjunction => "Conjunction",
            Self::Disjunction => "Disjunction",
            Self::Negation => "Negation",
            Self::Comparison => "Comparison",
            Self::Arithmetic => "Arithmetic",
            Self::SiteValue => "SiteValue",
        }
    }
}

impl ContextField {
    /// Total number of context fields
    pub const COUNT: usize = 2;

    /// Every field in bit order.
    pub const ALL: [ContextField; Self::COUNT] = [Self::Hint, Self::Region];

    /// Get the field name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hint => "Hint",
            Self::Region => "Region",
        }
    }
}

macro_rules! bitset {
    ($(#[$meta:meta])* $set:ident of $item:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub struct $set(u32);

        impl $set {
            /// Create an empty set.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Create a set containing every member of the universe.
            pub const fn all() -> Self {
                Self(((1u64 << $item::COUNT) - 1) as u32)
            }

            /// Create a set with a single member.
            pub const fn single(item: $item) -> Self {
                Self(1 << item as u32)
            }

            /// Add a member to this set.
            pub const fn with(self, item: $item) -> Self {
                Self(self.0 | (1 << item as u32))
            }

            /// Check if this set contains a member.
            pub const fn contains(self, item: $item) -> bool {
                (self.0 & (1 << item as u32)) != 0
            }

            /// Remove a member from this set.
            pub const fn without(self, item: $item) -> Self {
                Self(self.0 & !(1 << item as u32))
            }

            /// Check if this set is empty.
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Get the number of members in this set.
            pub const fn len(self) -> usize {
                self.0.count_ones() as usize
            }

            /// Compute the union of two sets.
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Compute the intersection of two sets.
            pub const fn intersection(self, other: Self) -> Self {
                Self(self.0 & other.0)
            }

            /// Check if this set is a subset of another.
            pub const fn is_subset_of(self, other: Self) -> bool {
                (self.0 & other.0) == self.0
            }

            /// Raw bit representation.
            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Iterate over the members in bit order.
            pub fn iter(self) -> impl Iterator<Item = $item> {
                $item::ALL.into_iter().filter(move |item| self.contains(*item))
            }
        }

        impl BitOr for $set {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl BitOrAssign for $set {
            fn bitor_assign(&mut self, rhs: Self) {
                *self = self.union(rhs);
            }
        }

        impl FromIterator<$item> for $set {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                iter.into_iter().fold(Self::empty(), Self::with)
            }
        }

        impl fmt::Debug for $set {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_set().entries(self.iter().map(|i| i.name())).finish()
            }
        }

        impl fmt::Display for $set {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let names: Vec<_> = self.iter().map(|i| i.name()).collect();
                write!(f, "{{{}}}", names.join(", "))
            }
        }
    };
}

bitset! {
    /// Bitset of engine capability requirements.
    GameFlags of GameFlag
}

bitset! {
    /// Bitset of descriptive concepts.
    ConceptSet of Concept
}

bitset! {
    /// Bitset of evaluation-context fields.
    ContextFieldSet of ContextField
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_names() {
        assert_eq!(GameFlag::DeductionPuzzle.name(), "DeductionPuzzle");
        assert_eq!(Concept::CountConstraint.name(), "CountConstraint");
        assert_eq!(ContextField::Region.name(), "Region");
    }

    #[test]
    fn test_all_tables_match_discriminants() {
        for (i, flag) in GameFlag::ALL.iter().enumerate() {
            assert_eq!(*flag as usize, i);
        }
        for (i, concept) in Concept::ALL.iter().enumerate() {
            assert_eq!(*concept as usize, i);
        }
        for (i, field) in ContextField::ALL.iter().enumerate() {
            assert_eq!(*field as usize, i);
        }
    }

    #[test]
    fn test_game_flags() {
        let empty = GameFlags::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);

        let set = GameFlags::empty()
            .with(GameFlag::DeductionPuzzle)
            .with(GameFlag::UsesHints);
        assert!(set.contains(GameFlag::DeductionPuzzle));
        assert!(set.contains(GameFlag::UsesHints));
        assert!(!set.contains(GameFlag::UsesCells));
        assert_eq!(set.len(), 2);

        let set2 = set.without(GameFlag::UsesHints);
        assert!(!set2.contains(GameFlag::UsesHints));
        assert_eq!(set2.len(), 1);
    }

    #[test]
    fn test_concept_set_operations() {
        let set1 = ConceptSet::empty()
            .with(Concept::Hints)
            .with(Concept::Region);
        let set2 = ConceptSet::empty()
            .with(Concept::Region)
            .with(Concept::Negation);

        let union = set1 | set2;
        assert_eq!(union.len(), 3);
        assert!(union.contains(Concept::Negation));

        let intersection = set1.intersection(set2);
        assert!(intersection.contains(Concept::Region));
        assert_eq!(intersection.len(), 1);

        assert!(set1.is_subset_of(union));
        assert!(!union.is_subset_of(set1));
    }

    #[test]
    fn test_all_sets() {
        assert_eq!(GameFlags::all().len(), GameFlag::COUNT);
        assert_eq!(ConceptSet::all().len(), Concept::COUNT);
        assert_eq!(ContextFieldSet::all().len(), ContextField::COUNT);
        assert!(ConceptSet::all().contains(Concept::SiteValue));
    }

    #[test]
    fn test_iter_and_collect() {
        let set: ContextFieldSet = [ContextField::Region, ContextField::Hint]
            .into_iter()
            .collect();
        let members: Vec<_> = set.iter().collect();
        assert_eq!(members, vec![ContextField::Hint, ContextField::Region]);
    }

    #[test]
    fn test_display() {
        let set = GameFlags::single(GameFlag::DeductionPuzzle).with(GameFlag::UsesEdges);
        assert_eq!(set.to_string(), "{DeductionPuzzle, UsesEdges}");
        assert_eq!(ContextFieldSet::empty().to_string(), "{}");
    }

    #[test]
    fn test_bit_or_assign() {
        let mut set = ConceptSet::empty();
        set |= ConceptSet::single(Concept::Arithmetic);
        set |= ConceptSet::single(Concept::Comparison);
        assert_eq!(set.len(), 2);
    }
}
