//! Error type for snapshot validation and the JSON boundary.
//!
//! The layout core itself reports failure by value (empty maps, `None`);
//! these errors only surface to callers that ask for validation or that
//! hand us JSON.

use thiserror::Error;

use crate::geometry::NodeId;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("node '{id}' has non-finite bounds")]
    NonFinite { id: NodeId },

    #[error("node '{id}' has a negative size")]
    NegativeSize { id: NodeId },

    #[error("node '{id}' has right/bottom edges that do not match its size")]
    InconsistentEdges { id: NodeId },

    #[error("node '{id}' appears more than once in the snapshot")]
    DuplicateId { id: NodeId },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
