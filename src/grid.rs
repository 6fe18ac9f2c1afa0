// Grid snapping and clamping for persisted positions.
//
// Positions stored in the flow definition are multiples of GRID_SIZE and
// never negative. Clamping wins over snapping: a value that rounds below
// zero ends up at zero.

use crate::geometry::FlowPosition;

/// Canvas grid spacing in pixels.
pub const GRID_SIZE: f64 = 20.0;

/// Round to the nearest grid line (halfway values round away from zero).
pub fn snap(value: f64) -> f64 {
    (value / GRID_SIZE).round() * GRID_SIZE
}

/// Forbid negative coordinates.
pub fn clamp(value: f64) -> f64 {
    // `+ 0.0` turns -0.0 into 0.0
    value.max(0.0) + 0.0
}

/// Snap then clamp both axes.
pub fn snap_position(left: f64, top: f64) -> FlowPosition {
    FlowPosition {
        left: clamp(snap(left)),
        top: clamp(snap(top)),
    }
}

/// Smallest grid line at or above `value`.
pub(crate) fn snap_up(value: f64) -> f64 {
    (value / GRID_SIZE).ceil() * GRID_SIZE
}

/// Largest grid line at or below `value`.
pub(crate) fn snap_down(value: f64) -> f64 {
    (value / GRID_SIZE).floor() * GRID_SIZE
}

pub fn is_aligned(value: f64) -> bool {
    value % GRID_SIZE == 0.0
}
