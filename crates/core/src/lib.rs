//! Ludeme Core
//!
//! Evaluates deduction-puzzle rule trees against a partial assignment and
//! analyzes them once per game before play.

pub mod analysis;
pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod game;
pub mod puzzle;
pub mod region;
pub mod storage;

pub use analysis::{compile, AnalysisOptions, CompiledRules, CrashPolicy, RuleSummary};
pub use ast::{BooleanNode, CompareOp, IntNode, Ludeme, Node, NodeRef, RegionNode, Value};
pub use context::EvalContext;
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use error::{Error, Result};
pub use game::{Board, Game, HintEntry, Hints, Mode, RegionDecl, StaticArea};
pub use region::Region;
pub use storage::StateStore;

pub use ludeme_foundation as foundation;
