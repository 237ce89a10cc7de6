//! Integration tests for end-to-end rule checking.
//!
//! These tests drive the full pipeline:
//! Describe game → Compile rules → Replay moves → Check consistency

use ludeme_core::analysis::{compile, AnalysisOptions, CrashPolicy};
use ludeme_core::ast::{BooleanNode, IntNode, RegionNode};
use ludeme_core::diagnostics::{format_diagnostics, DiagnosticKind};
use ludeme_core::game::{Board, Game, HintEntry, Hints, Mode, RegionDecl, StaticArea};
use ludeme_core::puzzle::{Direction, IsCount, IsUnique, IsValidDirections};
use ludeme_foundation::{Concept, ContextField, GameFlag, SiteType};
use ludeme_tests::PuzzleHarness;

const MINI_SUDOKU: &str = r#"{
    "name": "Mini Sudoku",
    "board": { "rows": 4, "columns": 4 },
    "regions": [
        { "name": "AllRegions", "areas": ["Rows", "Columns", "SubGrids"] }
    ]
}"#;

const MINI_SUDOKU_SOLUTION: [i32; 16] = [
    1, 2, 3, 4, //
    3, 4, 1, 2, //
    2, 1, 4, 3, //
    4, 3, 2, 1,
];

/// Every value appears exactly once in every row, column and block.
fn sudoku_rules(size: i32) -> BooleanNode {
    BooleanNode::And(
        (1..=size)
            .map(|value| {
                BooleanNode::Count(
                    IsCount::in_named("AllRegions", IntNode::Constant(1))
                        .with_what(IntNode::Constant(value)),
                )
            })
            .collect(),
    )
}

/// Scenarios A to D: three sites, count of ones must be two.
#[test]
fn test_count_scenarios() {
    let game = Game::puzzle("strip", Board::new(1, 3));
    let rules = IsCount::in_region(RegionNode::Sites(vec![0, 1, 2]), IntNode::Constant(2));
    let mut harness = PuzzleHarness::new(game, BooleanNode::Count(rules));

    // A: nothing resolved
    assert!(harness.is_consistent());

    // B: two ones, one open site
    harness.resolve(0, 1).resolve(1, 1);
    assert!(harness.is_consistent());

    // C: three ones
    harness.resolve(2, 1);
    assert!(!harness.is_consistent());

    // D: two ones and a two
    harness.resolve(2, 2);
    assert!(harness.is_consistent());
}

/// Solving a sudoku move by move never proves a contradiction.
#[test]
fn test_sudoku_solution_stays_consistent() {
    let mut harness = PuzzleHarness::from_json(MINI_SUDOKU, sudoku_rules(4));

    let summary = *harness.rules().summary();
    assert!(summary.flags.contains(GameFlag::DeductionPuzzle));
    assert!(summary.flags.contains(GameFlag::UsesCells));
    assert!(summary.concepts.contains(Concept::CountConstraint));
    assert!(summary.concepts.contains(Concept::StaticRegion));

    for (site, &value) in MINI_SUDOKU_SOLUTION.iter().enumerate() {
        harness.resolve(site, value);
        assert!(harness.is_consistent(), "contradiction after site {site}");
    }
}

#[test]
fn test_sudoku_conflicts() {
    let mut harness = PuzzleHarness::from_json(MINI_SUDOKU, sudoku_rules(4));

    // Same value twice in row 0
    harness.resolve(0, 1).resolve(3, 1);
    assert!(!harness.is_consistent());
    harness.unresolve(3);
    assert!(harness.is_consistent());

    // Same value twice in the top-left block
    harness.resolve(5, 1);
    assert!(!harness.is_consistent());
    harness.unresolve(5);

    // Same value twice in column 0
    harness.resolve(12, 1);
    assert!(!harness.is_consistent());
}

/// Each row holds as many ones as its hint says.
#[test]
fn test_hinted_row_counts() {
    let game = Game::puzzle("row counts", Board::square(3))
        .with_region(RegionDecl::with_areas("Rows", vec![StaticArea::Rows]))
        .with_hints(Hints {
            cells: vec![
                HintEntry::new(vec![0, 1, 2], vec![2]),
                HintEntry::new(vec![3, 4, 5], vec![1]),
                HintEntry::new(vec![6, 7, 8], vec![0]),
            ],
            ..Hints::default()
        });
    let rules = BooleanNode::Count(IsCount::in_named("Rows", IntNode::Hint { position: 0 }));
    let mut harness = PuzzleHarness::new(game, rules);

    let summary = *harness.rules().summary();
    assert!(summary.reads.contains(ContextField::Hint));
    assert!(summary.writes.contains(ContextField::Hint));

    harness.resolve_all(&[1, 1, 0, 0, 0, 1, 0, 0, 0]);
    assert!(harness.is_consistent());

    harness.resolve(7, 1);
    assert!(!harness.is_consistent());
}

/// Every cage holds exactly as many ones as its hint.
#[test]
fn test_for_each_cage() {
    let game = Game::puzzle("cages", Board::new(1, 5))
        .with_region(RegionDecl::with_sites("CageA", vec![0, 1, 2]))
        .with_region(RegionDecl::with_sites("CageB", vec![4, 3]))
        .with_hints(Hints {
            cells: vec![
                HintEntry::new(vec![0, 1, 2], vec![1]),
                HintEntry::new(vec![3, 4], vec![2]),
            ],
            ..Hints::default()
        });
    let rules = BooleanNode::for_each_region(
        "Cage",
        BooleanNode::Count(IsCount::in_region(
            RegionNode::Current,
            IntNode::Hint { position: 0 },
        )),
    );
    let mut harness = PuzzleHarness::new(game, rules);

    harness.resolve(0, 1);
    assert!(harness.is_consistent());
    harness.resolve(1, 1);
    assert!(!harness.is_consistent());
    harness.resolve(1, 0).resolve(2, 0);
    assert!(harness.is_consistent());

    harness.resolve(3, 1).resolve(4, 0);
    assert!(!harness.is_consistent());
    harness.resolve(4, 1);
    assert!(harness.is_consistent());
}

/// A cage without a hint is left unchecked; rules reading a hint at the top
/// level never compile.
#[test]
fn test_unhinted_cage_is_skipped() {
    let game = Game::puzzle("cages", Board::new(1, 4))
        .with_region(RegionDecl::with_sites("CageA", vec![0, 1]))
        .with_region(RegionDecl::with_sites("CageB", vec![2, 3]))
        .with_hints(Hints {
            cells: vec![HintEntry::new(vec![1, 0], vec![1])],
            ..Hints::default()
        });
    let cage_count = BooleanNode::Count(IsCount::in_region(
        RegionNode::Current,
        IntNode::Hint { position: 0 },
    ));

    let errors = compile(cage_count.clone(), &game, &AnalysisOptions::default()).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|d| d.kind == DiagnosticKind::MissingRequirement));

    let mut harness = PuzzleHarness::new(game, BooleanNode::for_each_region("Cage", cage_count));
    harness.resolve(2, 1).resolve(3, 1);
    assert!(harness.is_consistent());
    harness.resolve(0, 1).resolve(1, 1);
    assert!(!harness.is_consistent());
}

/// Binary puzzle: every line holds two ones and no two lines are equal.
#[test]
fn test_takuzu() {
    let game = Game::puzzle("takuzu", Board::square(4)).with_region(RegionDecl::with_areas(
        "Lines",
        vec![StaticArea::Rows, StaticArea::Columns],
    ));
    let rules = BooleanNode::And(vec![
        BooleanNode::Unique(IsUnique::named("Lines")),
        BooleanNode::Count(IsCount::in_named("Lines", IntNode::Constant(2))),
    ]);

    let mut solved = PuzzleHarness::new(game.clone(), rules.clone());
    solved.resolve_all(&[
        1, 0, 1, 0, //
        0, 1, 0, 1, //
        1, 1, 0, 0, //
        0, 0, 1, 1,
    ]);
    assert!(solved.is_consistent());

    let mut repeated = PuzzleHarness::new(game, rules);
    repeated.resolve_all(&[1, 0, 1, 0, 1, 0, 1, 0]);
    assert!(!repeated.is_consistent());
    repeated.unresolve(7);
    assert!(repeated.is_consistent());
}

#[test]
fn test_arrows() {
    let board = Board::square(1)
        .with_grid_edges()
        .with_default_site(SiteType::Edge);
    let game = Game::puzzle("arrows", board).with_hints(Hints {
        edges: vec![HintEntry::new(vec![0], vec![Direction::Backward.code()])],
        ..Hints::default()
    });
    let mut harness = PuzzleHarness::new(game, BooleanNode::ValidDirections(IsValidDirections));

    harness.resolve(1, Direction::Forward.code());
    assert!(harness.is_consistent());
    harness.resolve(0, Direction::Forward.code());
    assert!(!harness.is_consistent());
    harness.resolve(0, Direction::Backward.code());
    assert!(harness.is_consistent());
    harness.resolve_at(3, SiteType::Edge, 0);
    assert!(!harness.is_consistent());
}

/// Snapshots taken during play are checked in parallel.
#[test]
fn test_check_all_snapshots() {
    let mut harness = PuzzleHarness::from_json(MINI_SUDOKU, sudoku_rules(4));
    let mut snapshots = Vec::new();
    for (site, &value) in MINI_SUDOKU_SOLUTION.iter().enumerate() {
        harness.resolve(site, value);
        snapshots.push(harness.snapshot());
    }
    harness.resolve(15, 4);
    snapshots.push(harness.snapshot());

    let results = harness.rules().check_all(harness.game(), &snapshots);
    assert_eq!(results.len(), 17);
    let verdicts: Vec<bool> = results.into_iter().map(Result::unwrap).collect();
    assert!(verdicts[..16].iter().all(|v| *v));
    assert!(!verdicts[16]);
}

#[test]
fn test_wrong_mode_is_rejected() {
    let game = Game::from_json(MINI_SUDOKU).unwrap().with_mode(Mode::Alternating);
    let errors = compile(sudoku_rules(4), &game, &AnalysisOptions::default()).unwrap_err();
    assert_eq!(errors.len(), 4);
    assert!(errors
        .iter()
        .all(|d| d.kind == DiagnosticKind::MissingRequirement));
    let report = format_diagnostics(&errors);
    assert_eq!(report.lines().count(), 4);
    assert!(report.contains("missing requirement"));
}

#[test]
fn test_unpartitionable_region_is_rejected() {
    let game = Game::puzzle("odd", Board::new(3, 5))
        .with_region(RegionDecl::with_areas("AllRegions", vec![StaticArea::SubGrids]));
    let errors = compile(sudoku_rules(1), &game, &AnalysisOptions::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("SubGrids"));
}

#[test]
fn test_crash_policy_from_json() {
    let options: AnalysisOptions =
        serde_json::from_str(r#"{ "crash_policy": "Warn" }"#).unwrap();
    assert_eq!(options.crash_policy, CrashPolicy::Warn);

    let game = Game::from_json(MINI_SUDOKU).unwrap().with_players(2);
    assert!(compile(sudoku_rules(4), &game, &AnalysisOptions::default()).is_err());

    let harness = PuzzleHarness::with_options(game, sudoku_rules(4), &options);
    assert_eq!(harness.rules().warnings().len(), 4);
    assert!(harness.rules().warnings()[0].message.contains("2 players"));
    assert!(harness.is_consistent());
}
