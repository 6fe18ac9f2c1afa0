//! JSON payloads exchanged with the canvas frontend.
//!
//! Inputs are what the flow editor sends on drag end (node boxes, ids,
//! positions); outputs are serialized back for the position store.

use serde::{Deserialize, Serialize};

use crate::drag::DropPolicy;
use crate::error::{LayoutError, Result};
use crate::geometry::{FlowPosition, NodeBounds, NodeId};
use crate::reflow::ReflowOutcome;

/// A node box as sent by the frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeInput {
    pub id: NodeId,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl From<NodeInput> for NodeBounds {
    fn from(n: NodeInput) -> Self {
        NodeBounds::new(n.id, n.left, n.top, n.width, n.height)
    }
}

/// A persisted position, without size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOutput {
    pub id: NodeId,
    pub left: f64,
    pub top: f64,
}

/// Error information shown by the editor
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// Result of a reflow call
#[derive(Debug, Clone, Serialize, Default)]
pub struct ReflowOutput {
    /// Sorted by id so the payload is stable
    pub positions: Vec<PositionOutput>,
    pub converged: bool,
    pub passes: usize,
    /// Pairs still overlapping after the positions are applied
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub residual: Vec<(NodeId, NodeId)>,
    /// Nodes the solver could not move clear
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ReflowOutput {
    pub fn from_outcome(outcome: &ReflowOutcome, residual: Vec<(NodeId, NodeId)>) -> Self {
        let mut positions: Vec<PositionOutput> = outcome
            .positions
            .iter()
            .map(|(id, p)| PositionOutput { id: id.clone(), left: p.left, top: p.top })
            .collect();
        positions.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            positions,
            converged: outcome.converged,
            passes: outcome.passes,
            residual,
            unresolved: outcome.unresolved.clone(),
            error: None,
        }
    }

    pub fn from_error(e: &LayoutError) -> Self {
        Self {
            error: Some(ErrorInfo { message: e.to_string() }),
            ..Default::default()
        }
    }
}

/// Result of resolving a drop
#[derive(Debug, Clone, Serialize)]
pub struct DropOutput {
    pub policy: DropPolicy,
    pub dragged: FlowPosition,
    #[serde(flatten)]
    pub reflow: ReflowOutput,
}

pub fn parse_snapshot(json: &str) -> Result<Vec<NodeBounds>> {
    let nodes: Vec<NodeInput> = serde_json::from_str(json)?;
    Ok(nodes.into_iter().map(NodeBounds::from).collect())
}

pub fn parse_ids(json: &str) -> Result<Vec<NodeId>> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_positions(json: &str) -> Result<Vec<(NodeId, FlowPosition)>> {
    let entries: Vec<PositionOutput> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .map(|p| (p.id, FlowPosition { left: p.left, top: p.top }))
        .collect())
}
