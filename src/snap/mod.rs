//! # Synapse Snapping
//!
//! Nearest skeleton node for each synapse, via an R-tree (`rstar`) over
//! node coordinates. Synapse coordinates are multiplied by the per-axis
//! resolution before the query.
//!
//! Equidistant nodes resolve to the lowest node id so repeated runs agree.

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::model::{NodeId, Point3, Resolution, SynapseRecord};
use crate::partition::{NodeAssignment, SectionMap};
use crate::skeleton::SkeletonGraph;
use crate::{Error, Result};

type IndexedNode = GeomWithData<[f64; 3], NodeId>;

/// Nearest-node lookup over a skeleton's node coordinates.
pub struct SynapseSnapper {
    tree: RTree<IndexedNode>,
    resolution: Resolution,
}

/// A resolved nearest node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub node: NodeId,
    /// Squared distance in skeleton units.
    pub distance_2: f64,
}

impl SynapseSnapper {
    pub fn new(graph: &SkeletonGraph, resolution: Resolution) -> Result<Self> {
        resolution.validate()?;
        let points: Vec<IndexedNode> = graph
            .nodes()
            .iter()
            .map(|n| GeomWithData::new(n.position.to_array(), n.id))
            .collect();
        if points.is_empty() {
            return Err(Error::EmptySkeleton);
        }
        Ok(Self { tree: RTree::bulk_load(points), resolution })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest node to `p`, given in synapse-table units.
    pub fn nearest(&self, p: Point3) -> Option<Snap> {
        let query = self.resolution.apply(p);
        let q = query.to_array();

        let mut best: Option<Snap> = None;
        for candidate in self.tree.nearest_neighbor_iter(&q) {
            let d = query.distance_2(&Point3::from(*candidate.geom()));
            match best {
                None => best = Some(Snap { node: candidate.data, distance_2: d }),
                Some(b) if d > b.distance_2 => break,
                Some(b) if candidate.data < b.node => {
                    best = Some(Snap { node: candidate.data, distance_2: d });
                }
                Some(_) => {}
            }
        }
        best
    }

    /// Snap every record and attach its section and order.
    ///
    /// All snaps are resolved before any record is written, so on error
    /// the records keep their previous assignment.
    pub fn snap_all(&self, map: &SectionMap, records: &mut [SynapseRecord]) -> Result<usize> {
        if records.is_empty() {
            return Err(Error::EmptyPointCloudError);
        }
        if map.traversal().len() != self.len() {
            return Err(Error::MismatchedSectionMap {
                map_nodes: map.traversal().len(),
                graph_nodes: self.len(),
            });
        }

        let resolved = records
            .iter()
            .map(|rec| {
                let snap = self.nearest(rec.position).ok_or(Error::EmptySkeleton)?;
                let assignment = map.assignment(snap.node).ok_or(Error::UnknownNode(snap.node))?;
                Ok((snap.node, assignment))
            })
            .collect::<Result<Vec<(NodeId, NodeAssignment)>>>()?;

        for (rec, (node, assignment)) in records.iter_mut().zip(resolved) {
            rec.nearest_node = Some(node);
            rec.section = Some(assignment.section);
            rec.order = Some(assignment.order);
        }

        tracing::debug!(synapses = records.len(), nodes = self.len(), "snapped synapses");
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::model::SkeletonNode;
    use crate::SectionPipeline;

    fn chain(first: u64, n: u64) -> SkeletonGraph {
        let rows = (0..n)
            .map(|i| {
                let parent = i.checked_sub(1).map(|p| p + first);
                SkeletonNode::new(first + i, [i as f64 * 10.0, 0.0, 0.0], parent)
            })
            .collect();
        SkeletonGraph::from_nodes(rows).unwrap()
    }

    fn line() -> SkeletonGraph {
        chain(0, 5)
    }

    fn snapped_records(graph: &SkeletonGraph) -> (SectionMap, Vec<SynapseRecord>) {
        let map = SectionPipeline::new(PipelineConfig::default())
            .unwrap()
            .partition(graph, None)
            .unwrap();
        let mut records: Vec<SynapseRecord> = [[0.0, 0.0, 0.0], [38.0, 1.0, 0.0], [11.0, 0.0, 0.0]]
            .into_iter()
            .enumerate()
            .map(|(i, p)| SynapseRecord::from_row(crate::SynapseRow::new(i as u64, p)).unwrap())
            .collect();
        let s = SynapseSnapper::new(graph, Resolution::default()).unwrap();
        assert_eq!(s.snap_all(&map, &mut records).unwrap(), 3);
        (map, records)
    }

    #[test]
    fn test_nearest_on_line() {
        let s = SynapseSnapper::new(&line(), Resolution::default()).unwrap();
        assert_eq!(s.nearest(Point3::new(21.0, 3.0, 0.0)).unwrap().node, NodeId(2));
        assert_eq!(s.nearest(Point3::new(-50.0, 0.0, 0.0)).unwrap().node, NodeId(0));
        assert_eq!(s.nearest(Point3::new(40.0, 0.0, 0.0)).unwrap().distance_2, 0.0);
    }

    #[test]
    fn test_resolution_is_applied() {
        // (3, 0, 0) * 10 = (30, 0, 0).
        let s = SynapseSnapper::new(&line(), Resolution::new(10.0, 1.0, 1.0).unwrap()).unwrap();
        assert_eq!(s.nearest(Point3::new(3.0, 0.0, 0.0)).unwrap().node, NodeId(3));
    }

    #[test]
    fn test_equidistant_resolves_to_lowest_id() {
        let s = SynapseSnapper::new(&line(), Resolution::default()).unwrap();
        assert_eq!(s.nearest(Point3::new(15.0, 0.0, 0.0)).unwrap().node, NodeId(1));
    }

    #[test]
    fn test_snap_all_assigns_every_record() {
        let (_, records) = snapped_records(&line());
        let nearest: Vec<Option<NodeId>> = records.iter().map(|r| r.nearest_node).collect();
        assert_eq!(nearest, vec![Some(NodeId(0)), Some(NodeId(4)), Some(NodeId(1))]);
        assert!(records.iter().all(|r| r.is_assigned()));
    }

    #[test]
    fn test_map_of_another_size_is_rejected_untouched() {
        let graph = chain(0, 10);
        let (_, mut records) = snapped_records(&graph);
        let before = records.clone();

        let (small_map, _) = snapped_records(&chain(0, 3));
        let s = SynapseSnapper::new(&graph, Resolution::default()).unwrap();
        let err = s.snap_all(&small_map, &mut records).unwrap_err();
        assert!(matches!(err, Error::MismatchedSectionMap { map_nodes: 3, graph_nodes: 10 }));
        assert_eq!(records, before);
    }

    #[test]
    fn test_unknown_node_leaves_records_untouched() {
        let graph = line();
        let (_, mut records) = snapped_records(&graph);
        let before = records.clone();

        // Same size, disjoint ids.
        let (other_map, _) = snapped_records(&chain(100, 5));
        let s = SynapseSnapper::new(&graph, Resolution::default()).unwrap();
        let err = s.snap_all(&other_map, &mut records).unwrap_err();
        assert!(matches!(err, Error::UnknownNode(NodeId(0))));
        assert_eq!(records, before);
    }
}
