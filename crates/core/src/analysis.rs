//! Static analysis driver
//!
//! Runs once per compiled game, after the rule tree is built and before
//! play:
//!
//! 1. **Preprocess** - resolve default site types and cache per-node state.
//! 2. **Requirements** - every node whose capability the game lacks, and
//!    every read of a hint or region that no ancestor puts in scope, yields a
//!    fatal [`DiagnosticKind::MissingRequirement`].
//! 3. **Crash prediction** - every node that would fault against the game
//!    yields a [`DiagnosticKind::PredictedCrash`], fatal or a warning
//!    depending on [`CrashPolicy`].
//! 4. **Aggregation** - flags, concepts and context dependencies are folded
//!    once into a [`RuleSummary`] cached on the result.
//!
//! The resulting [`CompiledRules`] is immutable, so one instance can be
//! shared by any number of search workers, each evaluating against its own
//! [`StateStore`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use ludeme_foundation::{ConceptSet, ContextFieldSet, GameFlags};

use crate::ast::{Node, NodeRef, Value};
use crate::context::EvalContext;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{Error, Result};
use crate::game::Game;
use crate::storage::StateStore;

/// What to do with predicted crashes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum CrashPolicy {
    /// Abort compilation
    #[default]
    Fatal,
    /// Keep compiling and report them as warnings
    Warn,
}

/// Caller-selected analysis settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub crash_policy: CrashPolicy,
}

impl AnalysisOptions {
    pub fn with_crash_policy(mut self, crash_policy: CrashPolicy) -> Self {
        self.crash_policy = crash_policy;
        self
    }
}

/// Aggregates of a whole rule tree, computed once at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub flags: GameFlags,
    pub concepts: ConceptSet,
    pub reads: ContextFieldSet,
    pub writes: ContextFieldSet,
}

impl RuleSummary {
    pub fn of(root: NodeRef<'_>, game: &Game) -> Self {
        Self {
            flags: root.game_flags(game),
            concepts: root.concepts(game),
            reads: root.reads_context(),
            writes: root.writes_context(),
        }
    }
}

/// A rule tree that passed static analysis against one game.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    root: Node,
    summary: RuleSummary,
    warnings: Vec<Diagnostic>,
}

/// Analyze `root` against `game`.
///
/// Returns every fatal diagnostic of the first failing pass on error.
#[instrument(skip_all, fields(game = %game.name))]
pub fn compile(
    root: impl Into<Node>,
    game: &Game,
    options: &AnalysisOptions,
) -> std::result::Result<CompiledRules, Vec<Diagnostic>> {
    let mut root = root.into();
    info!(nodes = root.node_ref().size(), "analysis starting");

    root.preprocess(game);
    debug!("preprocess complete");

    let missing = collect_missing_requirements(root.node_ref(), game);
    if !missing.is_empty() {
        info!(count = missing.len(), "missing requirements");
        return Err(missing);
    }
    debug!("requirements satisfied");

    let crashes = collect_predicted_crashes(root.node_ref(), game);
    let warnings = match options.crash_policy {
        CrashPolicy::Fatal if !crashes.is_empty() => {
            info!(count = crashes.len(), "predicted crashes");
            return Err(crashes);
        }
        CrashPolicy::Fatal => Vec::new(),
        CrashPolicy::Warn => crashes
            .into_iter()
            .map(|diagnostic| {
                warn!(node = %diagnostic.node, "{}", diagnostic.message);
                diagnostic.downgraded()
            })
            .collect(),
    };

    let summary = RuleSummary::of(root.node_ref(), game);
    info!(
        flags = %summary.flags,
        concepts = summary.concepts.len(),
        warnings = warnings.len(),
        "analysis complete"
    );

    Ok(CompiledRules {
        root,
        summary,
        warnings,
    })
}

/// One diagnostic per failed own requirement and per context field read
/// outside any scope that provides it, leaves first.
///
/// The root is evaluated with neither a hint nor a region override.
pub fn collect_missing_requirements(root: NodeRef<'_>, game: &Game) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    root.visit_scoped(ContextFieldSet::empty(), &mut |node, scope| {
        if let Some(reason) = node.own_requirement(game) {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::MissingRequirement,
                node.to_string(),
                reason,
            ));
        }
        for field in node.own_reads().iter().filter(|f| !scope.contains(*f)) {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::MissingRequirement,
                node.to_string(),
                format!("reads the {} but no enclosing node puts one in scope", field.name()),
            ));
        }
    });
    diagnostics
}

/// One diagnostic per node that would fault against `game`, leaves first.
pub fn collect_predicted_crashes(root: NodeRef<'_>, game: &Game) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    root.visit_post_order(&mut |node| {
        if let Some(reason) = node.own_crash(game) {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::PredictedCrash,
                node.to_string(),
                reason,
            ));
        }
    });
    diagnostics
}

impl CompiledRules {
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn summary(&self) -> &RuleSummary {
        &self.summary
    }

    /// Downgraded crash predictions.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<Value> {
        self.root.eval(ctx)
    }

    /// Whether no contradiction is proven for `state`.
    pub fn is_satisfied(&self, game: &Game, state: &StateStore) -> Result<bool> {
        let mut ctx = EvalContext::new(game, state);
        match self.evaluate(&mut ctx)? {
            Value::Bool(satisfied) => Ok(satisfied),
            _ => Err(Error::unsupported(
                &self.root,
                "rule does not evaluate to a boolean",
            )),
        }
    }

    /// Check independent assignments in parallel, one context per store.
    pub fn check_all(&self, game: &Game, states: &[StateStore]) -> Vec<Result<bool>> {
        let results: Vec<_> = states
            .par_iter()
            .map(|state| self.is_satisfied(game, state))
            .collect();
        debug!(
            states = states.len(),
            satisfied = results.iter().filter(|r| matches!(r, Ok(true))).count(),
            "batch checked"
        );
        results
    }
}
