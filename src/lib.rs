//! Collision detection and node reflow for the flow editor canvas.
//!
//! When a node is dropped on the canvas, the editor builds a snapshot of
//! every rendered node's box, marks the nodes that must stay put as sacred,
//! and asks [`reflow`] for new positions for everything else. The result is
//! a diff: only nodes that moved are returned, grid aligned and never
//! negative. Persisting it is up to the caller.

pub mod bounds;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod output;
pub mod reflow;
mod wasm;

pub use bounds::{resolve_bounds, resolve_snapshot, SizeProvider};
pub use drag::{drop_policy, resolve_drop, DragDrop, DropPolicy, DropResolution};
pub use error::LayoutError;
pub use geometry::{detect_collisions, overlaps, FlowPosition, NodeBounds, NodeId, Size, OVERLAP_EPSILON};
pub use grid::{clamp, snap, snap_position, GRID_SIZE};
pub use reflow::{
    apply_positions, reflow, reflow_with_config, residual_overlaps, validate_snapshot, ReflowConfig,
    ReflowOutcome, MIN_MARGIN,
};
pub use wasm::DomSizeProvider;
