//! The cached per-neuron product: sections, ranks and a node lookup table.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use serde::Serialize;

use super::{merge::MergeOutcome, Segment, SectionOrder};
use crate::model::NodeId;
use crate::traversal::TraversalOrder;
use crate::{Error, Result};

/// Where a skeleton node landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeAssignment {
    /// Index into `SectionMap::sections`.
    pub segment: usize,
    /// Left-to-right section rank.
    pub section: usize,
    /// Rank of the node's traversal position within its section.
    pub order: usize,
}

/// Partition diagnostics. The skew ratio is reported only; it never
/// feeds back into the merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionStats {
    pub nodes: usize,
    pub branch_points: usize,
    pub target_sections: usize,
    pub initial_segments: usize,
    pub final_sections: usize,
    pub ordered_merges: usize,
    pub fallback_merges: usize,
    pub min_section_size: usize,
    pub max_section_size: usize,
    /// max / min section size.
    pub skew_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionMap {
    traversal: TraversalOrder,
    branch_points: BTreeSet<NodeId>,
    sections: Vec<Segment>,
    order: SectionOrder,
    #[serde(skip)]
    assignments: HashMap<NodeId, NodeAssignment>,
    stats: PartitionStats,
}

impl SectionMap {
    pub(crate) fn build(
        traversal: TraversalOrder,
        branch_points: BTreeSet<NodeId>,
        initial_segments: usize,
        target_sections: usize,
        merged: MergeOutcome,
    ) -> Result<Self> {
        let MergeOutcome { sections, ordered_merges, fallback_merges } = merged;
        let order = SectionOrder::compute(&sections, &traversal)?;

        let mut assignments = HashMap::with_capacity(traversal.len());
        for (segment, seg) in sections.iter().enumerate() {
            let section = order.rank(segment).ok_or_else(|| {
                Error::InvalidSkeleton(format!("segment {segment} has no rank"))
            })?;
            let mut members: Vec<(usize, NodeId)> = Vec::with_capacity(seg.len());
            for &n in seg.nodes() {
                members.push((traversal.position(n).ok_or(Error::UnknownNode(n))?, n));
            }
            members.sort_unstable();
            for (order, (_, n)) in members.into_iter().enumerate() {
                assignments.insert(n, NodeAssignment { segment, section, order });
            }
        }

        let min_section_size = sections.iter().map(Segment::len).min().unwrap_or(0);
        let max_section_size = sections.iter().map(Segment::len).max().unwrap_or(0);
        let skew_ratio = if min_section_size == 0 {
            0.0
        } else {
            max_section_size as f64 / min_section_size as f64
        };
        let stats = PartitionStats {
            nodes: traversal.len(),
            branch_points: branch_points.len(),
            target_sections,
            initial_segments,
            final_sections: sections.len(),
            ordered_merges,
            fallback_merges,
            min_section_size,
            max_section_size,
            skew_ratio,
        };

        tracing::info!(
            nodes = stats.nodes,
            branch_points = stats.branch_points,
            initial_segments,
            sections = stats.final_sections,
            min = min_section_size,
            max = max_section_size,
            skew = skew_ratio,
            "section map ready"
        );
        if fallback_merges > 0 {
            tracing::debug!(fallback_merges, "merges resolved without traversal adjacency");
        }

        Ok(Self { traversal, branch_points, sections, order, assignments, stats })
    }

    pub fn traversal(&self) -> &TraversalOrder {
        &self.traversal
    }

    pub fn branch_points(&self) -> &BTreeSet<NodeId> {
        &self.branch_points
    }

    /// Final sections in merge-list order (index = segment index).
    pub fn sections(&self) -> &[Segment] {
        &self.sections
    }

    pub fn section_order(&self) -> &SectionOrder {
        &self.order
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn stats(&self) -> &PartitionStats {
        &self.stats
    }

    pub fn assignment(&self, node: NodeId) -> Option<NodeAssignment> {
        self.assignments.get(&node).copied()
    }

    /// Section at left-to-right rank `rank`.
    pub fn section_at_rank(&self, rank: usize) -> Option<&Segment> {
        self.order.segments_by_rank().get(rank).map(|&seg| &self.sections[seg])
    }
}
