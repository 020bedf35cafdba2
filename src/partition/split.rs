//! Initial segmentation: cut the traversal at every branch point.
//!
//! Walking the traversal, each node joins the current segment when it
//! touches it. Branch points open a new segment. A node that touches
//! nothing in the current segment is a DFS backtrack; it joins the
//! smallest existing segment it has an edge to, which then becomes current.

use std::collections::BTreeSet;

use hashbrown::HashMap;

use super::{ensure_connected, verify_coverage, Segment, Stage};
use crate::model::NodeId;
use crate::skeleton::SkeletonGraph;
use crate::traversal::TraversalOrder;
use crate::{Error, Result};

/// Split `traversal` into connected segments.
pub fn partition_segments(
    graph: &SkeletonGraph,
    traversal: &TraversalOrder,
    branch_points: &BTreeSet<NodeId>,
) -> Result<Vec<Segment>> {
    let order = traversal.as_slice();
    let Some(&first) = order.first() else {
        return Err(Error::EmptySkeleton);
    };

    let mut segments = vec![Segment::new(first)];
    let mut owner: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());
    owner.insert(first, 0);
    let mut current = 0usize;
    let mut last = first;

    for &node in &order[1..] {
        if branch_points.contains(&node) {
            segments.push(Segment::new(node));
            current = segments.len() - 1;
        } else if graph.has_edge(last, node) || touches(graph, &owner, node, current) {
            segments[current].push(node);
        } else {
            let target = smallest_adjacent(graph, &owner, &segments, node)
                .ok_or(Error::NoParentSegmentError { node })?;
            tracing::trace!(node = %node, segment = target, "backtrack join");
            segments[target].push(node);
            current = target;
        }
        owner.insert(node, current);
        last = node;
    }

    for (i, seg) in segments.iter().enumerate() {
        ensure_connected(graph, seg, i, Stage::Partition)?;
    }
    verify_coverage(graph, &segments)?;

    tracing::debug!(
        segments = segments.len(),
        branch_points = branch_points.len(),
        "partitioned traversal"
    );
    Ok(segments)
}

/// Whether `node` has an edge into segment `seg`.
fn touches(
    graph: &SkeletonGraph,
    owner: &HashMap<NodeId, usize>,
    node: NodeId,
    seg: usize,
) -> bool {
    graph.neighbors(node).iter().any(|m| owner.get(m) == Some(&seg))
}

/// Smallest already-built segment with an edge to `node`; ties by index.
fn smallest_adjacent(
    graph: &SkeletonGraph,
    owner: &HashMap<NodeId, usize>,
    segments: &[Segment],
    node: NodeId,
) -> Option<usize> {
    graph
        .neighbors(node)
        .iter()
        .filter_map(|m| owner.get(m).copied())
        .min_by_key(|&s| (segments[s].len(), s))
}
