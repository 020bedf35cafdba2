//! Merge the smallest segments into their neighbours until the target
//! section count is reached.
//!
//! Each round re-sorts the live segments by size (stable, so ties keep
//! their list position) and pops the smallest. Among the segments it
//! shares an edge with, smallest first, the first one that continues it
//! in traversal order absorbs it in that direction. Otherwise the
//! smallest adjacent segment absorbs it at its tail.

use hashbrown::HashMap;
use serde::Serialize;

use super::{ensure_connected, Segment, Stage};
use crate::model::NodeId;
use crate::skeleton::SkeletonGraph;
use crate::traversal::TraversalOrder;
use crate::{Error, Result};

/// Merged sections plus how each merge was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    /// In final list order.
    pub sections: Vec<Segment>,
    /// Merges resolved by traversal adjacency.
    pub ordered_merges: usize,
    /// Merges that fell back to the smallest adjacent segment.
    pub fallback_merges: usize,
}

/// Reduce `segments` to `num_sections`. A no-op when there are already
/// `num_sections` or fewer.
pub fn merge_segments(
    graph: &SkeletonGraph,
    traversal: &TraversalOrder,
    segments: Vec<Segment>,
    num_sections: usize,
) -> Result<MergeOutcome> {
    let target = num_sections.max(1);
    if segments.len() <= target {
        return Ok(MergeOutcome { sections: segments, ordered_merges: 0, fallback_merges: 0 });
    }

    let initial = segments.len();
    let mut owner: HashMap<NodeId, usize> = HashMap::with_capacity(graph.node_count());
    for (slot, seg) in segments.iter().enumerate() {
        for &n in seg.nodes() {
            owner.insert(n, slot);
        }
    }
    let mut slots: Vec<Option<Segment>> = segments.into_iter().map(Some).collect();
    let mut list: Vec<usize> = (0..slots.len()).collect();
    let mut ordered_merges = 0;
    let mut fallback_merges = 0;

    while list.len() > target {
        list.sort_by_key(|&s| slot_len(&slots, s));
        let popped_slot = list.remove(0);
        let popped = slots[popped_slot].take().ok_or_else(|| {
            Error::InvalidSkeleton(format!("segment slot {popped_slot} already merged"))
        })?;

        let list_pos: HashMap<usize, usize> =
            list.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        let mut adjacent: Vec<usize> = popped
            .nodes()
            .iter()
            .flat_map(|&n| graph.neighbors(n))
            .filter_map(|m| owner.get(m).copied())
            .filter(|&s| s != popped_slot)
            .collect();
        adjacent.sort_unstable();
        adjacent.dedup();
        adjacent.sort_by_key(|s| {
            let pos = list_pos.get(s).copied().unwrap_or(usize::MAX);
            (slot_len(&slots, *s), pos)
        });

        let Some(&smallest) = adjacent.first() else {
            return Err(Error::UnreachableSegmentError {
                segment: popped_slot,
                size: popped.len(),
                first: popped.first(),
            });
        };

        let moved: Vec<NodeId> = popped.nodes().to_vec();
        let mut chosen = None;
        for &cand in &adjacent {
            let Some(c) = slots[cand].as_ref() else { continue };
            if traversal.immediately_precedes(popped.last(), c.first()) {
                chosen = Some((cand, true));
                break;
            }
            if traversal.immediately_precedes(c.last(), popped.first()) {
                chosen = Some((cand, false));
                break;
            }
        }

        let into = match chosen {
            Some((cand, in_front)) => {
                let c = slot_mut(&mut slots, cand)?;
                if in_front {
                    c.prepend(popped);
                } else {
                    c.append(popped);
                }
                ordered_merges += 1;
                cand
            }
            None => {
                slot_mut(&mut slots, smallest)?.append(popped);
                fallback_merges += 1;
                smallest
            }
        };
        for n in moved {
            owner.insert(n, into);
        }

        ensure_connected(graph, slot_mut(&mut slots, into)?, into, Stage::Merge)?;
        tracing::trace!(from = popped_slot, into, ordered = chosen.is_some(), "merged segment");
    }

    let sections: Vec<Segment> = list.into_iter().filter_map(|s| slots[s].take()).collect();
    tracing::debug!(
        initial,
        sections = sections.len(),
        ordered_merges,
        fallback_merges,
        "merged segments"
    );
    Ok(MergeOutcome { sections, ordered_merges, fallback_merges })
}

fn slot_len(slots: &[Option<Segment>], s: usize) -> usize {
    slots[s].as_ref().map_or(0, Segment::len)
}

fn slot_mut(slots: &mut [Option<Segment>], s: usize) -> Result<&mut Segment> {
    slots[s]
        .as_mut()
        .ok_or_else(|| Error::InvalidSkeleton(format!("segment slot {s} already merged")))
}
