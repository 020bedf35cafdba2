//! Section report export: serialize a section map and synapse
//! assignments as JSON.
//!
//! ```text
//! SectionMap + SynapseTable → export_section_report() → JSON document
//!   → annotation UI, archived alongside the proofreading session
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{NodeId, SynapseId};
use crate::partition::{PartitionStats, SectionMap};
use crate::table::SynapseTable;
use crate::traversal::RootSource;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub generated_at: DateTime<Utc>,
    pub root: NodeId,
    pub root_source: RootSource,
    pub stats: PartitionStats,
    /// In rank order.
    pub sections: Vec<SectionEntry>,
    pub synapses: Vec<SynapseEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionEntry {
    pub rank: usize,
    pub segment: usize,
    pub size: usize,
    pub mean_position: f64,
    pub first_node: NodeId,
    pub last_node: NodeId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SynapseEntry {
    pub id: SynapseId,
    pub nearest_node: Option<NodeId>,
    pub section: Option<usize>,
    pub order: Option<usize>,
}

/// Build the report without writing it.
pub fn section_report(map: &SectionMap, table: &SynapseTable) -> SectionReport {
    let order = map.section_order();
    let sections = order
        .segments_by_rank()
        .into_iter()
        .enumerate()
        .map(|(rank, segment)| {
            let seg = &map.sections()[segment];
            SectionEntry {
                rank,
                segment,
                size: seg.len(),
                mean_position: order.mean_position(segment).unwrap_or(0.0),
                first_node: seg.first(),
                last_node: seg.last(),
            }
        })
        .collect();

    let synapses = table
        .records()
        .iter()
        .map(|r| SynapseEntry {
            id: r.id,
            nearest_node: r.nearest_node,
            section: r.section,
            order: r.order,
        })
        .collect();

    SectionReport {
        generated_at: Utc::now(),
        root: map.traversal().root(),
        root_source: map.traversal().root_source(),
        stats: map.stats().clone(),
        sections,
        synapses,
    }
}

/// Write the report as pretty-printed JSON.
pub fn export_section_report(
    map: &SectionMap,
    table: &SynapseTable,
    writer: &mut dyn Write,
) -> Result<()> {
    let report = section_report(map, table);
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}
