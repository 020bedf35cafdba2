//! # Traversal Order
//!
//! Canonical depth-first pre-order of the skeleton. Root priority:
//! explicit root, then the graph's soma, then the PageRank-central node.
//! Children are visited in ascending id order.

pub mod pagerank;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::config::PageRankConfig;
use crate::model::NodeId;
use crate::skeleton::SkeletonGraph;
use crate::{Error, Result};

pub use pagerank::{most_central, pagerank};

/// How the traversal root was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootSource {
    Explicit,
    Soma,
    Centrality,
}

/// Pre-order node sequence plus its inverse (node → position).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraversalOrder {
    root: NodeId,
    root_source: RootSource,
    order: Vec<NodeId>,
    #[serde(skip)]
    position: HashMap<NodeId, usize>,
}

impl TraversalOrder {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_source(&self) -> RootSource {
        self.root_source
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Index of `id` in the traversal.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.position.get(&id).copied()
    }

    /// Whether `a` is visited immediately before `b`.
    pub fn immediately_precedes(&self, a: NodeId, b: NodeId) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa + 1 == pb,
            _ => false,
        }
    }
}

/// Compute the traversal order of `graph`.
pub fn traverse(
    graph: &SkeletonGraph,
    root: Option<NodeId>,
    cfg: &PageRankConfig,
) -> Result<TraversalOrder> {
    let (root, root_source) = match (root, graph.soma()) {
        (Some(r), _) => (r, RootSource::Explicit),
        (None, Some(s)) => (s, RootSource::Soma),
        (None, None) => {
            let central = most_central(graph, cfg).ok_or(Error::EmptySkeleton)?;
            (central, RootSource::Centrality)
        }
    };
    if !graph.contains(root) {
        return Err(Error::UnknownNode(root));
    }

    let total = graph.node_count();
    let mut order = Vec::with_capacity(total);
    let mut visited: HashSet<NodeId> = HashSet::with_capacity(total);
    let mut stack = vec![root];

    // Marking on pop with reversed pushes reproduces recursive pre-order.
    while let Some(n) = stack.pop() {
        if !visited.insert(n) {
            continue;
        }
        order.push(n);
        for &m in graph.neighbors(n).iter().rev() {
            if !visited.contains(&m) {
                stack.push(m);
            }
        }
    }

    if order.len() != total {
        return Err(Error::DisconnectedGraphError { reached: order.len(), total, root });
    }

    tracing::debug!(root = %root, source = ?root_source, nodes = total, "computed traversal order");

    let position = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    Ok(TraversalOrder { root, root_source, order, position })
}
