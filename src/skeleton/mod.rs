//! # Skeleton Graph
//!
//! Undirected adjacency over skeleton samples. Parent links from the input
//! rows are collapsed into a single edge set with normalised `(min, max)`
//! pairs, so there is exactly one representation of every edge.
//!
//! Nodes are stored sorted by id and each neighbour list is sorted
//! ascending. Every iteration order exposed here is therefore the id
//! order, which is what keeps traversal reproducible.

pub mod branch;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::model::{Node, NodeId, Point3, SkeletonNode};
use crate::{Error, Result};

pub use branch::branch_points;

type Neighbors = SmallVec<[NodeId; 4]>;

/// Immutable undirected skeleton graph.
#[derive(Debug, Clone)]
pub struct SkeletonGraph {
    /// Sorted by id.
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    /// Parallel to `nodes`; each list sorted ascending.
    adjacency: Vec<Neighbors>,
    edges: HashSet<(NodeId, NodeId)>,
    soma: Option<NodeId>,
}

impl SkeletonGraph {
    /// Build from parent-linked rows. A row flagged `is_soma` becomes the
    /// designated soma.
    pub fn from_nodes(rows: Vec<SkeletonNode>) -> Result<Self> {
        let mut soma = None;
        for row in &rows {
            if row.is_soma {
                if let Some(prev) = soma {
                    return Err(Error::InvalidSkeleton(format!(
                        "more than one soma node: {prev} and {}",
                        row.id
                    )));
                }
                soma = Some(row.id);
            }
        }

        let edges: Vec<(NodeId, NodeId)> = rows
            .iter()
            .filter_map(|r| r.parent.map(|p| (r.id, p)))
            .collect();
        let points = rows.into_iter().map(|r| (r.id, r.position)).collect();

        Self::from_edges(points, edges, soma)
    }

    /// Build from explicit points and undirected edges.
    pub fn from_edges(
        points: Vec<(NodeId, Point3)>,
        edges: Vec<(NodeId, NodeId)>,
        soma: Option<NodeId>,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptySkeleton);
        }

        let mut points = points;
        points.sort_by_key(|(id, _)| *id);

        let mut index = HashMap::with_capacity(points.len());
        for (i, (id, pos)) in points.iter().enumerate() {
            if !pos.is_finite() {
                return Err(Error::InvalidCoordinate(format!(
                    "node {id} has non-finite coordinate {pos:?}"
                )));
            }
            if index.insert(*id, i).is_some() {
                return Err(Error::InvalidSkeleton(format!("duplicate node id {id}")));
            }
        }

        if let Some(s) = soma {
            if !index.contains_key(&s) {
                return Err(Error::UnknownNode(s));
            }
        }

        let mut adjacency: Vec<Neighbors> = vec![Neighbors::new(); points.len()];
        let mut edge_set = HashSet::with_capacity(edges.len());
        for (a, b) in edges {
            if a == b {
                return Err(Error::InvalidSkeleton(format!("self loop on node {a}")));
            }
            let ia = *index.get(&a).ok_or_else(|| {
                Error::InvalidSkeleton(format!("edge references unknown node {a}"))
            })?;
            let ib = *index.get(&b).ok_or_else(|| {
                Error::InvalidSkeleton(format!("edge references unknown node {b}"))
            })?;
            // Duplicate and reversed parent links collapse here.
            if edge_set.insert(normalize(a, b)) {
                adjacency[ia].push(b);
                adjacency[ib].push(a);
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }

        let nodes = points
            .into_iter()
            .zip(&adjacency)
            .map(|((id, position), adj)| Node {
                id,
                position,
                degree: adj.len(),
                is_soma: soma == Some(id),
            })
            .collect();

        tracing::debug!(
            nodes = index.len(),
            edges = edge_set.len(),
            soma = ?soma,
            "built skeleton graph"
        );

        Ok(Self { nodes, index, adjacency, edges: edge_set, soma })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn soma(&self) -> Option<NodeId> {
        self.soma
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Neighbours of `id` in ascending id order; empty for unknown ids.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        match self.index.get(&id) {
            Some(&i) => self.adjacency[i].as_slice(),
            None => &[],
        }
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains(&normalize(a, b))
    }

    /// Whether the subgraph induced by `members` is connected.
    /// An empty set is reported as not connected.
    pub fn is_connected_subset(&self, members: &[NodeId]) -> bool {
        let Some(&start) = members.first() else {
            return false;
        };
        let set: HashSet<NodeId> = members.iter().copied().collect();
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(set.len());
        let mut stack = vec![start];
        seen.insert(start);
        while let Some(n) = stack.pop() {
            for &m in self.neighbors(n) {
                if set.contains(&m) && seen.insert(m) {
                    stack.push(m);
                }
            }
        }
        seen.len() == set.len()
    }
}

fn normalize(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

// ============================================================================
// Tests
// ============================================================================
