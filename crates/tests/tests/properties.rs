//! Property tests over randomly generated rule trees and assignments.

use ludeme_core::analysis::{compile, AnalysisOptions};
use ludeme_core::ast::{BooleanNode, CompareOp, IntNode, NodeRef, RegionNode};
use ludeme_core::context::EvalContext;
use ludeme_core::game::{Board, Game, HintEntry, Hints, RegionDecl, StaticArea};
use ludeme_core::puzzle::{IsCount, IsUnique};
use ludeme_core::region::Region;
use ludeme_core::storage::StateStore;
use ludeme_foundation::SiteType;
use proptest::prelude::*;

fn game() -> Game {
    Game::puzzle("props", Board::square(3))
        .with_region(RegionDecl::with_areas(
            "Lines",
            vec![StaticArea::Rows, StaticArea::Columns],
        ))
        .with_region(RegionDecl::with_sites("Cage", vec![0, 4, 8]))
        .with_hints(Hints {
            cells: vec![
                HintEntry::new(vec![0, 1, 2], vec![2, 1]),
                HintEntry::new(vec![3, 4, 5], vec![1, 0]),
                HintEntry::new(vec![6, 7, 8], vec![0, 3]),
            ],
            ..Hints::default()
        })
}

fn store(cells: &[Option<i32>]) -> StateStore {
    let mut state = StateStore::with_sizes(cells.len(), 0, 0);
    for (site, value) in cells.iter().enumerate() {
        if let Some(value) = value {
            state.resolve(site, SiteType::Cell, *value).unwrap();
        }
    }
    state
}

fn assignment(len: usize) -> impl Strategy<Value = Vec<Option<i32>>> {
    prop::collection::vec(prop::option::of(0i32..3), len)
}

fn compare_op() -> impl Strategy<Value = CompareOp> {
    prop_oneof![
        Just(CompareOp::Eq),
        Just(CompareOp::Ne),
        Just(CompareOp::Lt),
        Just(CompareOp::Le),
        Just(CompareOp::Gt),
        Just(CompareOp::Ge),
    ]
}

fn region_node() -> impl Strategy<Value = RegionNode> {
    prop_oneof![
        prop::collection::vec(0usize..9, 0..5).prop_map(RegionNode::Sites),
        Just(RegionNode::Current),
        Just(RegionNode::named("Cage")),
    ]
}

fn int_node() -> impl Strategy<Value = IntNode> {
    let leaf = prop_oneof![
        (-3i32..4).prop_map(IntNode::Constant),
        (0usize..2).prop_map(|position| IntNode::Hint { position }),
        (0usize..9).prop_map(IntNode::site_value),
        region_node().prop_map(IntNode::size),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(IntNode::Add),
            prop::collection::vec(inner.clone(), 0..3).prop_map(IntNode::Mul),
            inner.prop_map(|n| IntNode::Neg(Box::new(n))),
        ]
    })
}

fn bool_node() -> impl Strategy<Value = BooleanNode> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(BooleanNode::Constant),
        (compare_op(), int_node(), int_node())
            .prop_map(|(op, lhs, rhs)| BooleanNode::compare(op, lhs, rhs)),
        (region_node(), int_node(), 0i32..3).prop_map(|(region, result, what)| {
            BooleanNode::Count(
                IsCount::in_region(region, result).with_what(IntNode::Constant(what)),
            )
        }),
        int_node().prop_map(|result| BooleanNode::Count(IsCount::in_named("Lines", result))),
        Just(BooleanNode::Unique(IsUnique::named("Lines"))),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(BooleanNode::not),
            prop::collection::vec(inner.clone(), 0..3).prop_map(BooleanNode::And),
            prop::collection::vec(inner.clone(), 0..3).prop_map(BooleanNode::Or),
            inner.prop_map(|body| BooleanNode::for_each_region("Lines", body)),
        ]
    })
}

fn eval(tree: &BooleanNode, game: &Game, state: &StateStore) -> Result<bool, String> {
    let mut ctx = EvalContext::new(game, state).with_hint(vec![1, 2]);
    tree.eval(&mut ctx).map_err(|e| e.to_string())
}

proptest! {
    #[test]
    fn aggregates_are_monotonic(tree in bool_node()) {
        let game = game();
        let mut violations = Vec::new();
        NodeRef::from(&tree).visit_post_order(&mut |node| {
            let flags = node.game_flags(&game);
            let concepts = node.concepts(&game);
            for child in node.children() {
                if !child.game_flags(&game).is_subset_of(flags)
                    || !child.concepts(&game).is_subset_of(concepts)
                    || !child.reads_context().is_subset_of(node.reads_context())
                    || !child.writes_context().is_subset_of(node.writes_context())
                {
                    violations.push(format!("{child} under {node}"));
                }
            }
        });
        prop_assert!(violations.is_empty(), "{:?}", violations);
        prop_assert_eq!(tree.game_flags(&game), tree.game_flags(&game));
        prop_assert_eq!(tree.concepts(&game), tree.concepts(&game));
    }

    #[test]
    fn preprocess_is_idempotent(tree in bool_node(), cells in assignment(9)) {
        let game = game();
        let state = store(&cells);

        let mut once = tree.clone();
        once.preprocess(&game);
        let mut twice = once.clone();
        twice.preprocess(&game);

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(eval(&once, &game, &state), eval(&twice, &game, &state));
        prop_assert_eq!(eval(&tree, &game, &state), eval(&once, &game, &state));
    }

    #[test]
    fn count_is_consistent(cells in assignment(6), len in 0usize..=6, result in 0i32..5) {
        let game = Game::puzzle("strip", Board::new(1, 6));
        let state = store(&cells);
        let count = IsCount::in_region(RegionNode::Sites((0..len).collect()), IntNode::Constant(result));
        let mut ctx = EvalContext::new(&game, &state);
        let verdict = count.eval(&mut ctx).unwrap();

        let region = &cells[..len];
        let matches = region.iter().filter(|c| **c == Some(1)).count() as i32;
        let open = region.iter().any(Option::is_none);
        let expected = if len == 0 {
            true
        } else if matches > result {
            false
        } else if open {
            true
        } else {
            matches == result
        };
        prop_assert_eq!(verdict, expected);
    }

    #[test]
    fn context_is_restored(tree in bool_node(), cells in assignment(9)) {
        let game = game();
        let state = store(&cells);
        let mut ctx = EvalContext::new(&game, &state)
            .with_hint(vec![5, 6])
            .with_region(Region::new(vec![1, 2]));

        let _ = tree.eval(&mut ctx);

        prop_assert_eq!(ctx.hint(), Some(&[5, 6][..]));
        prop_assert_eq!(ctx.region().map(Region::sites), Some(&[1usize, 2][..]));
    }

    #[test]
    fn parallel_checks_match_sequential(
        states in prop::collection::vec(assignment(9), 1..8),
    ) {
        let game = game();
        let rules = BooleanNode::And(vec![
            BooleanNode::Unique(IsUnique::named("Lines")),
            BooleanNode::Count(IsCount::in_named("Lines", IntNode::Hint { position: 0 })),
        ]);
        let compiled = compile(rules, &game, &AnalysisOptions::default()).unwrap();
        let stores: Vec<StateStore> = states.iter().map(|cells| store(cells)).collect();

        let parallel: Vec<bool> = compiled
            .check_all(&game, &stores)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let sequential: Vec<bool> = stores
            .iter()
            .map(|state| compiled.is_satisfied(&game, state).unwrap())
            .collect();
        prop_assert_eq!(parallel, sequential);
    }
}
