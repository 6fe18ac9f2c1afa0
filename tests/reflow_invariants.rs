//! Property-based invariant tests for the reflow solver.
//!
//! Layouts are generated as one sacred box dropped anywhere on a canvas of
//! free boxes that do not overlap each other (one box per grid cell), which
//! is what the editor hands over after a drag.
//!
//! 1. Collision detection never reports the target itself.
//! 2. Overlap is symmetric.
//! 3. Sacred ids never appear in the result.
//! 4. Applying the result leaves no overlapping pair.
//! 5. Every returned position is grid aligned and non-negative.
//! 6. Reflowing an already resolved layout is a no-op.

use std::collections::HashSet;

use canvas_reflow::{
    apply_positions, detect_collisions, overlaps, reflow, reflow_with_config, residual_overlaps, NodeBounds, NodeId,
    ReflowConfig, GRID_SIZE,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const COLS: usize = 4;
const ROWS: usize = 4;

fn box_strategy(id: &'static str) -> impl Strategy<Value = NodeBounds> {
    (-100i32..=800, -100i32..=600, 0i32..=300, 0i32..=250)
        .prop_map(move |(l, t, w, h)| NodeBounds::new(id, l as f64, t as f64, w as f64, h as f64))
}

fn free_box(cell: usize, jitter: (i32, i32), size: (i32, i32)) -> NodeBounds {
    let col = (cell % COLS) as f64;
    let row = (cell / COLS) as f64;
    NodeBounds::new(
        format!("n{}", cell),
        col * 200.0 + jitter.0 as f64,
        row * 160.0 + jitter.1 as f64,
        size.0 as f64,
        size.1 as f64,
    )
}

/// (sacred id set, snapshot with the sacred box first)
fn layout_strategy() -> impl Strategy<Value = (HashSet<NodeId>, Vec<NodeBounds>)> {
    let cells = proptest::sample::subsequence((0..COLS * ROWS).collect::<Vec<_>>(), 0..=12);
    let sacred = (0i32..=700, 0i32..=600, 40i32..=300, 40i32..=250);
    let shapes = proptest::collection::vec(((0i32..=30, 0i32..=20), (40i32..=150, 30i32..=120)), COLS * ROWS);
    (cells, sacred, shapes).prop_map(|(cells, (l, t, w, h), shapes)| {
        let mut all = vec![NodeBounds::new("sacred", l as f64, t as f64, w as f64, h as f64)];
        for cell in cells {
            let (jitter, size) = shapes[cell];
            all.push(free_box(cell, jitter, size));
        }
        let sacred: HashSet<NodeId> = [NodeId::from("sacred")].into_iter().collect();
        (sacred, all)
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Collision detection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn collisions_never_include_target(target in box_strategy("t"), twin in box_strategy("t"), other in box_strategy("o")) {
        let all = vec![twin, target.clone(), other];
        for hit in detect_collisions(&target, &all) {
            prop_assert_ne!(hit.id.as_str(), "t");
        }
    }

    #[test]
    fn overlap_is_symmetric(a in box_strategy("a"), b in box_strategy("b")) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3-6. Reflow
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sacred_ids_never_move((sacred, all) in layout_strategy()) {
        let out = reflow(&sacred, &all);
        for id in &sacred {
            prop_assert!(!out.contains_key(id));
        }
    }

    #[test]
    fn resolved_layout_has_no_overlaps((sacred, all) in layout_strategy()) {
        let out = reflow_with_config(&sacred, &all, &ReflowConfig::default());
        prop_assert!(out.converged);
        let residual = residual_overlaps(&all, &out.positions);
        prop_assert!(residual.is_empty(), "overlaps remain: {:?}", residual);
    }

    #[test]
    fn positions_are_aligned_and_non_negative((sacred, all) in layout_strategy()) {
        for p in reflow(&sacred, &all).values() {
            prop_assert_eq!(p.left % GRID_SIZE, 0.0);
            prop_assert_eq!(p.top % GRID_SIZE, 0.0);
            prop_assert!(p.left >= 0.0 && p.top >= 0.0);
        }
    }

    #[test]
    fn reflow_is_idempotent((sacred, all) in layout_strategy()) {
        let first = reflow(&sacred, &all);
        let resolved = apply_positions(&all, &first);
        prop_assert!(reflow(&sacred, &resolved).is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Concrete scenarios
// ═════════════════════════════════════════════════════════════════════════

fn rect(id: &str, left: f64, top: f64, right: f64, bottom: f64) -> NodeBounds {
    NodeBounds::new(id, left, top, right - left, bottom - top)
}

fn only(id: &str) -> HashSet<NodeId> {
    [NodeId::from(id)].into_iter().collect()
}

#[test]
fn offset_stack_of_twenty_terminates() {
    let all: Vec<NodeBounds> = (0..20)
        .map(|i| {
            let o = i as f64 * 10.0;
            NodeBounds::new(format!("n{}", i), o, o, 100.0, 100.0)
        })
        .collect();
    let out = reflow_with_config(&only("n0"), &all, &ReflowConfig::default());
    assert!(out.passes <= 100);
    assert!(!out.positions.is_empty());
}

#[test]
fn edge_touch_counts_as_overlap() {
    let a = rect("a", 0.0, 0.0, 100.0, 100.0);
    let b = rect("b", 100.0, 0.0, 200.0, 100.0);
    assert!(overlaps(&a, &b));
}

#[test]
fn horizontal_push_beats_vertical() {
    let all = vec![rect("s", 100.0, 100.0, 200.0, 200.0), rect("f", 180.0, 100.0, 280.0, 200.0)];
    let out = reflow(&only("s"), &all);
    let f = out[&NodeId::from("f")];
    assert!(f.left > 200.0);
    assert_eq!(f.top, 100.0);
}

#[test]
fn blocked_downward_path_moves_sideways() {
    let all = vec![
        rect("s", 100.0, 100.0, 200.0, 200.0),
        rect("a", 100.0, 150.0, 200.0, 250.0),
        rect("b", 100.0, 280.0, 200.0, 380.0),
    ];
    let out = reflow(&only("s"), &all);
    let a = out[&NodeId::from("a")];
    assert!(a.left >= 200.0 || a.left + 100.0 <= 100.0, "a should move sideways: {:?}", a);
    assert!(!out.contains_key(&NodeId::from("b")));
}
