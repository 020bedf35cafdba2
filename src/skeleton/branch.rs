//! Branch point detection.

use std::collections::BTreeSet;

use super::SkeletonGraph;
use crate::model::NodeId;

/// Minimum degree that makes a node a junction.
pub const BRANCH_DEGREE: usize = 3;

/// Node ids with degree ≥ 3, in ascending order.
pub fn branch_points(graph: &SkeletonGraph) -> BTreeSet<NodeId> {
    graph
        .nodes()
        .iter()
        .filter(|n| n.degree >= BRANCH_DEGREE)
        .map(|n| n.id)
        .collect()
}
