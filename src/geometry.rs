// Bounds model for canvas nodes.
//
// Nodes are approximated by axis-aligned boxes in canvas pixels. Only the
// origin (left/top) is ever persisted; width/height come from rendering.
//
// The overlap test uses a small buffer so that boxes whose edges coincide
// exactly are still treated as colliding. After a reflow, neighbours are
// always separated by at least the configured margin, so this never causes
// a resolved layout to be reported as colliding.

use serde::{Deserialize, Serialize};

/// Buffer in pixels applied by [`overlaps`].
pub const OVERLAP_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendered size of a node.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Persisted position of a node in the flow definition.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPosition {
    pub left: f64,
    pub top: f64,
}

impl FlowPosition {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Bounding box of a node at a given position.
///
/// Invariant: `right == left + width` and `bottom == top + height`. Use
/// [`NodeBounds::new`] or [`NodeBounds::moved_to`] to keep it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBounds {
    pub id: NodeId,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBounds {
    pub fn new(id: impl Into<NodeId>, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            left,
            top,
            right: left + width,
            bottom: top + height,
            width,
            height,
        }
    }

    /// Same node and size with the origin moved.
    pub fn moved_to(&self, left: f64, top: f64) -> Self {
        Self::new(self.id.clone(), left, top, self.width, self.height)
    }

    pub fn position(&self) -> FlowPosition {
        FlowPosition { left: self.left, top: self.top }
    }

    /// Finite coordinates, non-negative size and consistent far edges.
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.left, self.top, self.right, self.bottom, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.width >= 0.0
            && self.height >= 0.0
            && edges_match(self.left, self.width, self.right)
            && edges_match(self.top, self.height, self.bottom)
    }
}

fn edges_match(start: f64, extent: f64, end: f64) -> bool {
    ((start + extent) - end).abs() <= 1e-6 * (1.0 + end.abs())
}

/// True when the two boxes intersect, counting touching edges.
///
/// Boxes are only considered apart on an axis when the gap between them is
/// larger than [`OVERLAP_EPSILON`].
pub fn overlaps(a: &NodeBounds, b: &NodeBounds) -> bool {
    let apart = a.right < b.left - OVERLAP_EPSILON
        || a.left > b.right + OVERLAP_EPSILON
        || a.bottom < b.top - OVERLAP_EPSILON
        || a.top > b.bottom + OVERLAP_EPSILON;
    !apart
}

/// All boxes in `all` that overlap `target`, in input order.
/// Boxes sharing the target's id are never reported.
pub fn detect_collisions(target: &NodeBounds, all: &[NodeBounds]) -> Vec<NodeBounds> {
    all.iter()
        .filter(|b| b.id != target.id && overlaps(target, b))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(id: &str, left: f64, top: f64, right: f64, bottom: f64) -> NodeBounds {
        NodeBounds::new(id, left, top, right - left, bottom - top)
    }

    #[test]
    fn test_new_derives_far_edges() {
        let b = NodeBounds::new("a", 10.0, 20.0, 100.0, 50.0);
        assert_eq!(b.right, 110.0);
        assert_eq!(b.bottom, 70.0);
        assert!(b.is_well_formed());
    }

    #[test]
    fn test_moved_to_keeps_size() {
        let b = NodeBounds::new("a", 10.0, 20.0, 100.0, 50.0).moved_to(200.0, 0.0);
        assert_eq!(b.right, 300.0);
        assert_eq!(b.bottom, 50.0);
        assert_eq!((b.width, b.height), (100.0, 50.0));
    }

    #[test]
    fn test_malformed_bounds() {
        let mut b = NodeBounds::new("a", 0.0, 0.0, 10.0, 10.0);
        b.right = 50.0;
        assert!(!b.is_well_formed());
        assert!(!NodeBounds::new("a", f64::NAN, 0.0, 10.0, 10.0).is_well_formed());
        assert!(!NodeBounds::new("a", 0.0, 0.0, -1.0, 10.0).is_well_formed());
    }

    #[test]
    fn test_overlapping_boxes() {
        let a = bounds("a", 0.0, 0.0, 100.0, 100.0);
        let b = bounds("b", 50.0, 50.0, 150.0, 150.0);
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn test_shared_edge_is_overlap() {
        let a = bounds("a", 0.0, 0.0, 100.0, 100.0);
        let right = bounds("b", 100.0, 0.0, 200.0, 100.0);
        let below = bounds("c", 0.0, 100.0, 100.0, 200.0);
        assert!(overlaps(&a, &right));
        assert!(overlaps(&a, &below));
    }

    #[test]
    fn test_gap_beyond_buffer_is_clear() {
        let a = bounds("a", 0.0, 0.0, 100.0, 100.0);
        assert!(!overlaps(&a, &bounds("b", 101.0, 0.0, 200.0, 100.0)));
        assert!(!overlaps(&a, &bounds("c", 0.0, 120.0, 100.0, 200.0)));
        // within the buffer still collides
        assert!(overlaps(&a, &bounds("d", 100.4, 0.0, 200.0, 100.0)));
    }

    #[test]
    fn test_detect_collisions_skips_self_and_keeps_order() {
        let target = bounds("t", 0.0, 0.0, 100.0, 100.0);
        let all = vec![
            bounds("c", 90.0, 90.0, 150.0, 150.0),
            bounds("t", 0.0, 0.0, 100.0, 100.0),
            bounds("far", 500.0, 500.0, 600.0, 600.0),
            bounds("a", -50.0, 10.0, 10.0, 20.0),
        ];
        let hits = detect_collisions(&target, &all);
        let ids: Vec<&str> = hits.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_detect_collisions_empty() {
        let target = bounds("t", 0.0, 0.0, 100.0, 100.0);
        assert!(detect_collisions(&target, &[]).is_empty());
    }
}
