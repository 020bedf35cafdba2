//! Left-to-right section ranking by mean traversal position.

use serde::Serialize;

use super::Segment;
use crate::model::NodeId;
use crate::traversal::TraversalOrder;
use crate::{Error, Result};

/// Segment index → dense 0-based rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOrder {
    ranks: Vec<usize>,
    mean_positions: Vec<f64>,
}

impl SectionOrder {
    /// Rank `sections` ascending by the mean traversal position of their
    /// nodes; ties go to the lower segment index.
    pub fn compute(sections: &[Segment], traversal: &TraversalOrder) -> Result<Self> {
        let mut mean_positions = Vec::with_capacity(sections.len());
        for seg in sections {
            let mut sum = 0usize;
            for &n in seg.nodes() {
                sum += position(traversal, n)?;
            }
            mean_positions.push(sum as f64 / seg.len().max(1) as f64);
        }

        let mut by_mean: Vec<usize> = (0..sections.len()).collect();
        by_mean.sort_by(|&a, &b| mean_positions[a].total_cmp(&mean_positions[b]).then(a.cmp(&b)));

        let mut ranks = vec![0; sections.len()];
        for (rank, seg) in by_mean.into_iter().enumerate() {
            ranks[seg] = rank;
        }
        Ok(Self { ranks, mean_positions })
    }

    /// Rank of segment `segment`.
    pub fn rank(&self, segment: usize) -> Option<usize> {
        self.ranks.get(segment).copied()
    }

    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    pub fn mean_position(&self, segment: usize) -> Option<f64> {
        self.mean_positions.get(segment).copied()
    }

    /// Segment indices ordered by rank.
    pub fn segments_by_rank(&self) -> Vec<usize> {
        let mut out = vec![0; self.ranks.len()];
        for (seg, &rank) in self.ranks.iter().enumerate() {
            out[rank] = seg;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

fn position(traversal: &TraversalOrder, n: NodeId) -> Result<usize> {
    traversal.position(n).ok_or(Error::UnknownNode(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageRankConfig;
    use crate::model::SkeletonNode;
    use crate::skeleton::SkeletonGraph;
    use crate::traversal::traverse;

    fn chain_traversal(n: u64) -> TraversalOrder {
        let rows = (0..n)
            .map(|i| SkeletonNode::new(i, [i as f64, 0.0, 0.0], i.checked_sub(1)))
            .collect();
        let g = SkeletonGraph::from_nodes(rows).unwrap();
        traverse(&g, Some(NodeId(0)), &PageRankConfig::default()).unwrap()
    }

    fn seg(v: &[u64]) -> Segment {
        Segment::from_nodes(v.iter().copied().map(NodeId).collect()).unwrap()
    }

    #[test]
    fn test_rank_by_mean_position() {
        let t = chain_traversal(6);
        let order = SectionOrder::compute(&[seg(&[4, 5]), seg(&[0, 1]), seg(&[2, 3])], &t).unwrap();
        assert_eq!(order.ranks(), &[2, 0, 1]);
        assert_eq!(order.segments_by_rank(), vec![1, 2, 0]);
        assert_eq!(order.mean_position(0), Some(4.5));
    }

    #[test]
    fn test_ties_follow_segment_index() {
        let t = chain_traversal(5);
        // Both means are 2.0.
        let order = SectionOrder::compute(&[seg(&[0, 4]), seg(&[1, 3]), seg(&[2])], &t).unwrap();
        assert_eq!(order.ranks(), &[0, 1, 2]);
    }

    #[test]
    fn test_unknown_node() {
        let t = chain_traversal(2);
        assert!(matches!(
            SectionOrder::compute(&[seg(&[7])], &t),
            Err(Error::UnknownNode(NodeId(7)))
        ));
    }
}
