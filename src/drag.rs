// Drop handling for a dragged node.
//
// Decides how much authority a drop has and turns it into a single reflow
// call:
// - Authoritative: the dropped node stays exactly where it was released
//   (grid snapped) and everything else moves out of its way.
// - Advisory: the dropped node yields. It is clipped to just below the
//   lowest node it landed on; the nodes it landed on keep their place and
//   anything under the clipped spot is pushed away.
//
// Under both policies the dragged node is sacred in the reflow call. For an
// advisory drop that pins the clipped spot, so the node lands where the
// clip put it and never shows up in the reflow result.
//
// A drop is authoritative when the node was released below the vertical
// midpoint of where it started.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{detect_collisions, overlaps, FlowPosition, NodeBounds, NodeId, Size};
use crate::grid::{clamp, snap, snap_position, snap_up};
use crate::reflow::{reflow_with_config, ReflowConfig, ReflowOutcome, MIN_MARGIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    Authoritative,
    Advisory,
}

/// A finished drag gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragDrop {
    pub id: NodeId,
    /// Position before the drag started.
    pub from: FlowPosition,
    /// Position where the node was released.
    pub to: FlowPosition,
    pub size: Size,
}

impl DragDrop {
    pub fn original_bounds(&self) -> NodeBounds {
        NodeBounds::new(self.id.clone(), self.from.left, self.from.top, self.size.width, self.size.height)
    }

    pub fn dropped_bounds(&self) -> NodeBounds {
        let p = snap_position(self.to.left, self.to.top);
        NodeBounds::new(self.id.clone(), p.left, p.top, self.size.width, self.size.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropResolution {
    pub policy: DropPolicy,
    /// Final position of the dragged node.
    pub dragged: FlowPosition,
    /// Moves for every other node.
    pub outcome: ReflowOutcome,
}

pub fn drop_policy(drag: &DragDrop) -> DropPolicy {
    let original = drag.original_bounds();
    let midpoint = original.top + original.height / 2.0;
    if drag.to.top > midpoint {
        DropPolicy::Authoritative
    } else {
        DropPolicy::Advisory
    }
}

/// Resolve a drop against the current snapshot.
///
/// `pinned` nodes never move. The dragged node's entry in `all` (if any) is
/// replaced by its dropped bounds.
pub fn resolve_drop(
    drag: &DragDrop,
    pinned: &HashSet<NodeId>,
    all: &[NodeBounds],
    cfg: &ReflowConfig,
) -> DropResolution {
    let policy = drop_policy(drag);
    let mut dropped = drag.dropped_bounds();
    let others: Vec<NodeBounds> = all.iter().filter(|b| b.id != drag.id).cloned().collect();

    let mut sacred: HashSet<NodeId> = pinned.iter().filter(|id| **id != drag.id).cloned().collect();

    if policy == DropPolicy::Advisory {
        let landed = detect_collisions(&dropped, &others);
        if !landed.is_empty() {
            sacred.extend(landed.iter().map(|b| b.id.clone()));
            let blockers: Vec<NodeBounds> = others.iter().filter(|b| sacred.contains(&b.id)).cloned().collect();
            dropped = clip_below(&dropped, &landed, &blockers, cfg.margin.max(MIN_MARGIN));
            tracing::debug!(node = %drag.id, top = dropped.top, "drop yields to the nodes it landed on");
        }
    }
    sacred.insert(drag.id.clone());

    let mut snapshot = others;
    snapshot.push(dropped.clone());
    let outcome = reflow_with_config(&sacred, &snapshot, cfg);

    DropResolution {
        policy,
        dragged: dropped.position(),
        outcome,
    }
}

/// Move `node` straight down below `landed`, then past any blocker it
/// still hits.
fn clip_below(node: &NodeBounds, landed: &[NodeBounds], blockers: &[NodeBounds], margin: f64) -> NodeBounds {
    let left = clamp(snap(node.left));
    let lowest = landed.iter().map(|b| b.bottom).fold(node.top, f64::max);
    let mut clipped = node.moved_to(left, clamp(snap_up(lowest + margin)));

    for _ in 0..blockers.len() {
        let floor = blockers
            .iter()
            .filter(|b| overlaps(&clipped, b))
            .map(|b| b.bottom)
            .fold(f64::NEG_INFINITY, f64::max);
        if floor == f64::NEG_INFINITY {
            break;
        }
        clipped = clipped.moved_to(left, clamp(snap_up(floor + margin)));
    }
    clipped
}
