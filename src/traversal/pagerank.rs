//! PageRank centrality over the undirected skeleton.
//!
//! Each undirected edge counts as two directed edges. Isolated nodes
//! (only possible in a single-node skeleton) spread their mass uniformly.

use hashbrown::HashMap;

use crate::config::PageRankConfig;
use crate::model::NodeId;
use crate::skeleton::SkeletonGraph;

/// Power-iteration PageRank. Scores sum to 1.
pub fn pagerank(graph: &SkeletonGraph, cfg: &PageRankConfig) -> HashMap<NodeId, f64> {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    let n = ids.len();
    if n == 0 {
        return HashMap::new();
    }
    let slot: HashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let nf = n as f64;

    let mut rank = vec![1.0 / nf; n];
    let mut next = vec![0.0; n];

    for iteration in 0..cfg.max_iterations {
        let dangling: f64 = ids
            .iter()
            .zip(&rank)
            .filter(|(id, _)| graph.degree(**id) == 0)
            .map(|(_, r)| *r)
            .sum();
        let base = (1.0 - cfg.damping) / nf + cfg.damping * dangling / nf;
        next.iter_mut().for_each(|v| *v = base);

        for (i, id) in ids.iter().enumerate() {
            let neighbors = graph.neighbors(*id);
            if neighbors.is_empty() {
                continue;
            }
            let share = cfg.damping * rank[i] / neighbors.len() as f64;
            for m in neighbors {
                next[slot[m]] += share;
            }
        }

        let delta: f64 = rank.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut rank, &mut next);
        if delta < cfg.tolerance * nf {
            tracing::trace!(iteration, delta, "pagerank converged");
            break;
        }
    }

    ids.into_iter().zip(rank).collect()
}

/// Node with the highest score; ties go to the lowest id.
pub fn most_central(graph: &SkeletonGraph, cfg: &PageRankConfig) -> Option<NodeId> {
    let scores = pagerank(graph, cfg);
    let mut best: Option<(NodeId, f64)> = None;
    // node_ids() is ascending, so a strict comparison keeps the lowest id on ties.
    for id in graph.node_ids() {
        let s = scores[&id];
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((id, s)),
        }
    }
    best.map(|(id, _)| id)
}
