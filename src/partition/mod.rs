//! # Partitioning
//!
//! Traversal order → initial segments (`split`) → merged sections
//! (`merge`) → left-to-right ranks (`order`) → node lookup table (`map`).
//!
//! Every stage checks that each segment induces a connected subgraph
//! before handing its output on.

pub mod split;
pub mod merge;
pub mod order;
pub mod map;

use serde::{Deserialize, Serialize};

use crate::model::NodeId;
use crate::skeleton::SkeletonGraph;
use crate::{Error, Result};

pub use split::partition_segments;
pub use merge::{merge_segments, MergeOutcome};
pub use order::SectionOrder;
pub use map::{NodeAssignment, PartitionStats, SectionMap};

/// A non-empty, connected, ordered list of skeleton nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    nodes: Vec<NodeId>,
}

impl Segment {
    pub fn new(first: NodeId) -> Self {
        Self { nodes: vec![first] }
    }

    /// Build from a node list; `None` when empty.
    pub fn from_nodes(nodes: Vec<NodeId>) -> Option<Self> {
        if nodes.is_empty() { None } else { Some(Self { nodes }) }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true for a constructed segment.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn last(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    /// Append `other` after this segment's nodes.
    pub fn append(&mut self, other: Segment) {
        self.nodes.extend(other.nodes);
    }

    /// Put `other` in front of this segment's nodes.
    pub fn prepend(&mut self, other: Segment) {
        let mut nodes = other.nodes;
        nodes.append(&mut self.nodes);
        self.nodes = nodes;
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

/// Processing stage, reported when a connectivity check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Partition,
    Merge,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Partition => write!(f, "partition"),
            Stage::Merge => write!(f, "merge"),
        }
    }
}

pub(crate) fn ensure_connected(
    graph: &SkeletonGraph,
    segment: &Segment,
    index: usize,
    stage: Stage,
) -> Result<()> {
    if graph.is_connected_subset(segment.nodes()) {
        Ok(())
    } else {
        Err(Error::DisconnectedSegment { segment: index, stage })
    }
}

/// Check that `segments` cover every node of `graph` exactly once.
pub fn verify_coverage(graph: &SkeletonGraph, segments: &[Segment]) -> Result<()> {
    let mut seen = hashbrown::HashSet::with_capacity(graph.node_count());
    for (i, seg) in segments.iter().enumerate() {
        for &n in seg.nodes() {
            if !graph.contains(n) {
                return Err(Error::UnknownNode(n));
            }
            if !seen.insert(n) {
                return Err(Error::InvalidSkeleton(format!("node {n} appears twice (segment {i})")));
            }
        }
    }
    if seen.len() != graph.node_count() {
        return Err(Error::InvalidSkeleton(format!(
            "segments cover {} of {} nodes",
            seen.len(),
            graph.node_count()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_concat() {
        let mut a = Segment::from_nodes(vec![NodeId(1), NodeId(2)]).unwrap();
        let b = Segment::from_nodes(vec![NodeId(3)]).unwrap();
        let c = Segment::new(NodeId(0));
        a.append(b);
        a.prepend(c);
        assert_eq!(a.nodes(), &[NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(a.first(), NodeId(0));
        assert_eq!(a.last(), NodeId(3));
        assert!(Segment::from_nodes(vec![]).is_none());
    }
}
