// Bounds resolution.
//
// Turns a node id plus its persisted position into a bounding box. The size
// comes from a caller-supplied SizeProvider (the DOM in the browser, a plain
// map in tests); nothing here measures anything itself.

use std::collections::HashMap;

use crate::geometry::{FlowPosition, NodeBounds, NodeId, Size};

/// Capability for looking up the rendered size of a node.
pub trait SizeProvider {
    /// `None` when the node is not rendered or its size is unknown.
    fn size_of(&self, id: &NodeId) -> Option<Size>;
}

impl SizeProvider for HashMap<NodeId, Size> {
    fn size_of(&self, id: &NodeId) -> Option<Size> {
        self.get(id).copied()
    }
}

impl<F> SizeProvider for F
where
    F: Fn(&NodeId) -> Option<Size>,
{
    fn size_of(&self, id: &NodeId) -> Option<Size> {
        self(id)
    }
}

/// Build the bounding box for `id` at `position`.
///
/// Returns `None` if the provider cannot size the node, or reports a size
/// that is negative or not finite. Callers must leave such nodes out of the
/// snapshot instead of guessing.
pub fn resolve_bounds<P>(id: &NodeId, position: FlowPosition, provider: &P) -> Option<NodeBounds>
where
    P: SizeProvider + ?Sized,
{
    let size = provider.size_of(id)?;
    let usable = size.width.is_finite()
        && size.height.is_finite()
        && size.width >= 0.0
        && size.height >= 0.0;
    if !usable || !position.left.is_finite() || !position.top.is_finite() {
        return None;
    }
    Some(NodeBounds::new(id.clone(), position.left, position.top, size.width, size.height))
}

/// Resolve a whole snapshot, skipping nodes that cannot be sized.
/// Input order is kept.
pub fn resolve_snapshot<P>(positions: &[(NodeId, FlowPosition)], provider: &P) -> Vec<NodeBounds>
where
    P: SizeProvider + ?Sized,
{
    positions
        .iter()
        .filter_map(|(id, pos)| {
            let resolved = resolve_bounds(id, *pos, provider);
            if resolved.is_none() {
                tracing::debug!(node = %id, "skipping node without a rendered size");
            }
            resolved
        })
        .collect()
}
