//! Integration test harness for the ludeme crates.
//!
//! Wraps the full pipeline: describe a game, compile a rule tree against it,
//! then replay moves into a state store and ask after each one whether a
//! contradiction has been proven.

use ludeme_core::analysis::{compile, AnalysisOptions, CompiledRules};
use ludeme_core::ast::Node;
use ludeme_core::game::Game;
use ludeme_core::storage::StateStore;
use ludeme_foundation::SiteType;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a fmt subscriber for the current test binary.
///
/// Use the `RUST_LOG` environment variable to override the default filter.
/// Safe to call from every test; only the first call installs anything.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ludeme_core=info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// A compiled puzzle plus one evolving assignment.
pub struct PuzzleHarness {
    game: Game,
    rules: CompiledRules,
    state: StateStore,
}

impl PuzzleHarness {
    /// Compile `rules` against `game` with default options.
    ///
    /// # Panics
    ///
    /// Panics if static analysis rejects the rules.
    pub fn new(game: Game, rules: impl Into<Node>) -> Self {
        Self::with_options(game, rules, &AnalysisOptions::default())
    }

    /// # Panics
    ///
    /// Panics if static analysis rejects the rules.
    pub fn with_options(game: Game, rules: impl Into<Node>, options: &AnalysisOptions) -> Self {
        init_logging();
        let rules = match compile(rules, &game, options) {
            Ok(rules) => rules,
            Err(diagnostics) => panic!(
                "analysis failed:\n{}",
                ludeme_core::diagnostics::format_diagnostics(&diagnostics)
            ),
        };
        let state = StateStore::new(&game.board);
        Self { game, rules, state }
    }

    /// # Panics
    ///
    /// Panics if the JSON is not a valid game or analysis fails.
    pub fn from_json(json: &str, rules: impl Into<Node>) -> Self {
        let game = Game::from_json(json).expect("invalid game description");
        Self::new(game, rules)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Commit `value` to a site of the board's default type.
    pub fn resolve(&mut self, site: usize, value: i32) -> &mut Self {
        let site_type = self.game.board.default_site;
        self.resolve_at(site, site_type, value)
    }

    pub fn resolve_at(&mut self, site: usize, site_type: SiteType, value: i32) -> &mut Self {
        self.state
            .resolve(site, site_type, value)
            .unwrap_or_else(|e| panic!("move rejected: {e}"));
        self
    }

    /// Commit `values` to sites `0..values.len()` in order.
    pub fn resolve_all(&mut self, values: &[i32]) -> &mut Self {
        for (site, &value) in values.iter().enumerate() {
            self.resolve(site, value);
        }
        self
    }

    pub fn unresolve(&mut self, site: usize) -> &mut Self {
        let site_type = self.game.board.default_site;
        self.state
            .unresolve(site, site_type)
            .unwrap_or_else(|e| panic!("undo rejected: {e}"));
        self
    }

    /// Whether no contradiction is proven for the current assignment.
    ///
    /// # Panics
    ///
    /// Panics if evaluation fails.
    pub fn is_consistent(&self) -> bool {
        self.rules
            .is_satisfied(&self.game, &self.state)
            .unwrap_or_else(|e| panic!("evaluation failed: {e}"))
    }

    /// Copy of the current assignment, for batch checks.
    pub fn snapshot(&self) -> StateStore {
        self.state.clone()
    }
}
