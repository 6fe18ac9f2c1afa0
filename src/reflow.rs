// Reflow solver.
//
// Pushes free nodes out of the way of sacred ones (typically the node that
// was just dropped) so that no two boxes overlap afterwards.
//
// Approach:
// - Sacred boxes never move. Every box placed during the call becomes an
//   obstacle at its new position, just like a sacred one.
// - Each pass walks the free boxes in input order. A free box that hits an
//   obstacle gets four candidate slots (up/down/left/right), each just past
//   the obstacles it hits plus the margin, already grid aligned.
// - Candidates slide further in their direction until they hit no obstacle,
//   so a free node can never be pushed into a sacred one. Up/left slides
//   that run into the canvas origin are dropped.
// - The winner disturbs the fewest other free boxes, then moves the least.
// - Passes repeat until nothing moves or the pass cap is reached.
//
// Deterministic: no hashing order leaks into the result, ties are broken by
// a fixed direction order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::geometry::{overlaps, FlowPosition, NodeBounds, NodeId, OVERLAP_EPSILON};
use crate::grid::{clamp, snap, snap_down, snap_position, snap_up};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflowConfig {
    /// Minimum spacing left between a moved node and what it was pushed off.
    pub margin: f64,
    /// Hard cap on solver passes. Hitting it returns a partial result.
    pub max_passes: usize,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            max_passes: 100,
        }
    }
}

/// Smallest usable margin. Anything at or below the overlap buffer leaves
/// moved nodes touching what they were pushed off.
pub const MIN_MARGIN: f64 = 2.0 * OVERLAP_EPSILON;

impl ReflowConfig {
    /// Copy with the margin raised to [`MIN_MARGIN`] (NaN included).
    pub fn sanitized(&self) -> Self {
        let margin = self.margin.max(MIN_MARGIN);
        if margin != self.margin {
            tracing::warn!(margin = self.margin, used = margin, "reflow margin too small, raising it");
        }
        Self { margin, ..*self }
    }
}

/// Result of one solver call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReflowOutcome {
    /// New grid-aligned positions for the nodes that moved.
    pub positions: HashMap<NodeId, FlowPosition>,
    /// Number of passes run.
    pub passes: usize,
    /// False when the pass cap stopped the solver before a fixed point, or
    /// when some node could not be moved clear.
    pub converged: bool,
    /// Free nodes still hitting an obstacle because no slot was found.
    pub unresolved: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Fixed order used to break exact ties.
const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

struct Candidate {
    bounds: NodeBounds,
    direction: Direction,
    rank: usize,
    /// Free boxes this slot would hit that the node did not already hit.
    new_collisions: usize,
    displacement: f64,
}

impl Candidate {
    fn cmp_cost(&self, other: &Candidate) -> Ordering {
        self.new_collisions
            .cmp(&other.new_collisions)
            .then(self.displacement.total_cmp(&other.displacement))
            .then(self.rank.cmp(&other.rank))
    }
}

/// Check that a snapshot can be reflowed.
pub fn validate_snapshot(all: &[NodeBounds]) -> Result<()> {
    let mut seen: HashSet<&NodeId> = HashSet::new();
    for b in all {
        let values = [b.left, b.top, b.right, b.bottom, b.width, b.height];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::NonFinite { id: b.id.clone() });
        }
        if b.width < 0.0 || b.height < 0.0 {
            return Err(LayoutError::NegativeSize { id: b.id.clone() });
        }
        if !b.is_well_formed() {
            return Err(LayoutError::InconsistentEdges { id: b.id.clone() });
        }
        if !seen.insert(&b.id) {
            return Err(LayoutError::DuplicateId { id: b.id.clone() });
        }
    }
    Ok(())
}

/// Compute new positions for free nodes so nothing overlaps the sacred ones.
///
/// Sacred ids never appear in the result. Empty or malformed snapshots give
/// an empty map.
pub fn reflow(sacred: &HashSet<NodeId>, all: &[NodeBounds]) -> HashMap<NodeId, FlowPosition> {
    reflow_with_config(sacred, all, &ReflowConfig::default()).positions
}

pub fn reflow_with_config(
    sacred: &HashSet<NodeId>,
    all: &[NodeBounds],
    cfg: &ReflowConfig,
) -> ReflowOutcome {
    let cfg = &cfg.sanitized();
    if all.is_empty() {
        return ReflowOutcome { converged: true, ..Default::default() };
    }
    if let Err(e) = validate_snapshot(all) {
        tracing::warn!(error = %e, "refusing to reflow malformed snapshot");
        return ReflowOutcome::default();
    }

    // 1. Partition; sacred boxes seed the obstacle list
    let mut obstacles: Vec<NodeBounds> = Vec::new();
    let mut free: Vec<NodeBounds> = Vec::new();
    for b in all {
        if sacred.contains(&b.id) {
            obstacles.push(b.clone());
        } else {
            free.push(b.clone());
        }
    }

    let mut outcome = ReflowOutcome::default();
    if free.is_empty() || obstacles.is_empty() {
        outcome.converged = true;
        return outcome;
    }

    let mut placed = vec![false; free.len()];

    // 2. Passes until a fixed point or the cap
    let mut stuck: Vec<NodeId> = Vec::new();
    while outcome.passes < cfg.max_passes {
        outcome.passes += 1;
        let mut moved_this_pass = 0usize;
        stuck.clear();

        for i in 0..free.len() {
            if placed[i] {
                continue;
            }
            let colliders: Vec<&NodeBounds> = obstacles
                .iter()
                .filter(|o| overlaps(&free[i], o))
                .collect();
            if colliders.is_empty() {
                continue;
            }

            let best = DIRECTIONS
                .iter()
                .enumerate()
                .filter_map(|(rank, &dir)| {
                    let bounds = slide_clear(&free[i], &colliders, &obstacles, dir, cfg)?;
                    Some(score_candidate(bounds, dir, rank, i, &free, &placed))
                })
                .min_by(|a, b| a.cmp_cost(b));

            let Some(best) = best else {
                tracing::debug!(node = %free[i].id, "no free slot found for node");
                stuck.push(free[i].id.clone());
                continue;
            };

            tracing::debug!(
                node = %free[i].id,
                direction = ?best.direction,
                left = best.bounds.left,
                top = best.bounds.top,
                "moved node"
            );
            outcome
                .positions
                .insert(best.bounds.id.clone(), snap_position(best.bounds.left, best.bounds.top));
            obstacles.push(best.bounds.clone());
            free[i] = best.bounds;
            placed[i] = true;
            moved_this_pass += 1;
        }

        if moved_this_pass == 0 {
            // Nothing left to move; stuck nodes would stay stuck on every later pass.
            outcome.converged = stuck.is_empty();
            break;
        }
    }
    outcome.unresolved = stuck;

    if !outcome.unresolved.is_empty() {
        tracing::warn!(nodes = ?outcome.unresolved, "reflow left nodes overlapping an obstacle");
    } else if !outcome.converged {
        tracing::warn!(
            passes = outcome.passes,
            moved = outcome.positions.len(),
            "reflow hit the pass cap, returning partial result"
        );
    }
    outcome
}

/// Grid-aligned box for `node` at a raw origin, moving in `dir`.
///
/// The moving axis is rounded away from what it is escaping so the margin
/// survives snapping; the other axis goes to the nearest grid line.
fn aligned(node: &NodeBounds, left: f64, top: f64, dir: Direction) -> NodeBounds {
    let (l, t) = match dir {
        Direction::Up => (snap(left), snap_down(top)),
        Direction::Down => (snap(left), snap_up(top)),
        Direction::Left => (snap_down(left), snap(top)),
        Direction::Right => (snap_up(left), snap(top)),
    };
    node.moved_to(clamp(l), clamp(t))
}

/// Origin that clears every box in `hits` when moving in `dir`.
fn escape_origin(node: &NodeBounds, hits: &[&NodeBounds], dir: Direction, margin: f64) -> (f64, f64) {
    match dir {
        Direction::Up => {
            let edge = hits.iter().map(|h| h.top).fold(f64::INFINITY, f64::min);
            (node.left, edge - node.height - margin)
        }
        Direction::Down => {
            let edge = hits.iter().map(|h| h.bottom).fold(f64::NEG_INFINITY, f64::max);
            (node.left, edge + margin)
        }
        Direction::Left => {
            let edge = hits.iter().map(|h| h.left).fold(f64::INFINITY, f64::min);
            (edge - node.width - margin, node.top)
        }
        Direction::Right => {
            let edge = hits.iter().map(|h| h.right).fold(f64::NEG_INFINITY, f64::max);
            (edge + margin, node.top)
        }
    }
}

/// Slide `node` in `dir` until it is clear of all obstacles.
fn slide_clear(
    node: &NodeBounds,
    colliders: &[&NodeBounds],
    obstacles: &[NodeBounds],
    dir: Direction,
    cfg: &ReflowConfig,
) -> Option<NodeBounds> {
    let (left, top) = escape_origin(node, colliders, dir, cfg.margin);
    let mut candidate = aligned(node, left, top, dir);

    // Every step clears at least one obstacle for good.
    for _ in 0..=obstacles.len() {
        let hits: Vec<&NodeBounds> = obstacles.iter().filter(|o| overlaps(&candidate, o)).collect();
        if hits.is_empty() {
            return Some(candidate);
        }
        let pinned = match dir {
            Direction::Up => candidate.top <= 0.0,
            Direction::Left => candidate.left <= 0.0,
            Direction::Down | Direction::Right => false,
        };
        if pinned {
            return None;
        }
        let (left, top) = escape_origin(&candidate, &hits, dir, cfg.margin);
        candidate = aligned(&candidate, left, top, dir);
    }
    None
}

fn score_candidate(
    bounds: NodeBounds,
    direction: Direction,
    rank: usize,
    index: usize,
    free: &[NodeBounds],
    placed: &[bool],
) -> Candidate {
    let original = &free[index];
    let new_collisions = free
        .iter()
        .enumerate()
        .filter(|&(j, other)| {
            j != index && !placed[j] && overlaps(&bounds, other) && !overlaps(original, other)
        })
        .count();
    let displacement = (bounds.left - original.left).hypot(bounds.top - original.top);
    Candidate { bounds, direction, rank, new_collisions, displacement }
}

/// The snapshot with `positions` applied. Boxes not in the map stay put.
pub fn apply_positions(all: &[NodeBounds], positions: &HashMap<NodeId, FlowPosition>) -> Vec<NodeBounds> {
    all.iter()
        .map(|b| match positions.get(&b.id) {
            Some(p) => b.moved_to(p.left, p.top),
            None => b.clone(),
        })
        .collect()
}

/// Pairs of ids that still overlap once `positions` is applied.
pub fn residual_overlaps(
    all: &[NodeBounds],
    positions: &HashMap<NodeId, FlowPosition>,
) -> Vec<(NodeId, NodeId)> {
    let applied = apply_positions(all, positions);
    let mut pairs = Vec::new();
    for (i, a) in applied.iter().enumerate() {
        for b in &applied[i + 1..] {
            if overlaps(a, b) {
                pairs.push((a.id.clone(), b.id.clone()));
            }
        }
    }
    pairs
}
