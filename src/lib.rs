//! # neuron-sections: Skeleton Partitioning for Synapse Proofreading
//!
//! Splits a neuron skeleton into a bounded number of connected sections,
//! ranks them left-to-right along the skeleton, snaps every synapse to
//! its nearest skeleton node and paginates the result for annotation.
//!
//! ## Pipeline
//!
//! ```text
//! skeleton rows → SkeletonGraph → branch points + traversal order
//!   → initial segments → merged sections → section ranks → SectionMap
//! synapse rows → SynapseTable → snap (R-tree) → section/order columns → pages
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use neuron_sections::{PipelineConfig, SectionPipeline, SkeletonGraph, SkeletonNode,
//!     SynapseRow, SynapseTable};
//!
//! # fn example() -> neuron_sections::Result<()> {
//! let rows = vec![
//!     SkeletonNode::new(0, [0.0, 0.0, 0.0], None),
//!     SkeletonNode::new(1, [1.0, 0.0, 0.0], Some(0)),
//!     SkeletonNode::new(2, [2.0, 0.0, 0.0], Some(1)),
//! ];
//! let graph = SkeletonGraph::from_nodes(rows)?;
//!
//! let pipeline = SectionPipeline::new(PipelineConfig::default())?;
//! let map = pipeline.partition(&graph, None)?;
//!
//! let mut table = SynapseTable::from_rows(vec![SynapseRow::new(7, [1.9, 0.1, 0.0])])?;
//! let layout = pipeline.annotate(&graph, &map, &mut table)?;
//! assert_eq!(table.records()[0].nearest_node.map(|n| n.0), Some(2));
//! assert_eq!(layout.page_count(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod skeleton;
pub mod traversal;
pub mod partition;
pub mod snap;
pub mod paging;
pub mod table;
pub mod source;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Node, NodeId, Point3, SkeletonNode,
    NeuronId, Resolution, SynapseId, SynapseRecord, SynapseRow,
};

// ============================================================================
// Re-exports: Pipeline stages
// ============================================================================

pub use config::{PipelineConfig, PageRankConfig, SectionTarget};
pub use skeleton::{SkeletonGraph, branch_points};
pub use traversal::{TraversalOrder, RootSource, traverse};
pub use partition::{
    Segment, SectionOrder, SectionMap, NodeAssignment, PartitionStats, MergeOutcome,
    partition_segments, merge_segments,
};
pub use snap::{SynapseSnapper, Snap};
pub use paging::{PageAssigner, PageLayout, Page, section_page_count};
pub use table::{SynapseTable, SharedSynapseTable};
pub use source::{SkeletonSource, SynapseSource, MemorySource, fetch_with_retry};

// ============================================================================
// Top-level pipeline handle
// ============================================================================

/// The primary entry point. Holds a validated configuration and runs the
/// partition and annotation stages.
#[derive(Debug, Clone)]
pub struct SectionPipeline {
    config: PipelineConfig,
}

/// Everything produced for one neuron by `SectionPipeline::load_neuron`.
#[derive(Debug, Clone)]
pub struct AnnotatedNeuron {
    pub neuron: NeuronId,
    pub graph: SkeletonGraph,
    pub map: SectionMap,
    pub table: SynapseTable,
    pub layout: PageLayout,
}

impl SectionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Partition a skeleton into ranked sections.
    ///
    /// `root` overrides the soma; with neither, the PageRank-central node
    /// is used.
    pub fn partition(&self, graph: &SkeletonGraph, root: Option<NodeId>) -> Result<SectionMap> {
        // Phase 1: Branch points and traversal
        let branches = branch_points(graph);
        let traversal = traverse(graph, root, &self.config.pagerank)?;

        // Phase 2: Split at branch points
        let segments = partition_segments(graph, &traversal, &branches)?;
        let initial = segments.len();

        // Phase 3: Merge down to the target
        let target = self.config.section_target.resolve(branches.len());
        let merged = merge_segments(graph, &traversal, segments, target)?;

        // Phase 4: Rank and index
        SectionMap::build(traversal, branches, initial, target, merged)
    }

    /// Snap every synapse in `table`, attach section/order, and lay out pages.
    pub fn annotate(
        &self,
        graph: &SkeletonGraph,
        map: &SectionMap,
        table: &mut SynapseTable,
    ) -> Result<PageLayout> {
        let snapper = SynapseSnapper::new(graph, self.config.resolution)?;
        snapper.snap_all(map, table.records_mut())?;
        PageAssigner::new(self.config.page_size)?.assign(table.records(), map.section_count())
    }

    /// `annotate` against a shared table, holding its write lock for the
    /// whole read-modify-write.
    pub fn annotate_shared(
        &self,
        graph: &SkeletonGraph,
        map: &SectionMap,
        table: &SharedSynapseTable,
    ) -> Result<PageLayout> {
        table.update(|t| self.annotate(graph, map, t))
    }

    /// Fetch, partition and annotate one neuron.
    pub async fn load_neuron<K, S>(
        &self,
        skeletons: &K,
        synapses: &S,
        neuron: NeuronId,
    ) -> Result<AnnotatedNeuron>
    where
        K: SkeletonSource + ?Sized,
        S: SynapseSource + ?Sized,
    {
        let rows = fetch_with_retry("skeleton", || skeletons.fetch_skeleton(neuron)).await?;
        let graph = SkeletonGraph::from_nodes(rows)?;
        let map = self.partition(&graph, None)?;

        let rows = fetch_with_retry("synapse table", || synapses.fetch_synapses(neuron)).await?;
        let mut table = SynapseTable::from_rows(rows)?;
        let layout = self.annotate(&graph, &map, &mut table)?;

        tracing::info!(
            neuron = %neuron,
            sections = map.section_count(),
            synapses = table.len(),
            pages = layout.page_count(),
            "neuron loaded"
        );
        Ok(AnnotatedNeuron { neuron, graph, map, table, layout })
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Disconnected skeleton: traversal from {root} reached {reached} of {total} nodes")]
    DisconnectedGraphError { reached: usize, total: usize, root: NodeId },

    #[error("No existing segment is adjacent to node {node}")]
    NoParentSegmentError { node: NodeId },

    #[error("Segment {segment} (size {size}, first node {first}) has no adjacent segment")]
    UnreachableSegmentError { segment: usize, size: usize, first: NodeId },

    #[error("Segment {segment} is not connected after {stage}")]
    DisconnectedSegment { segment: usize, stage: partition::Stage },

    #[error("Section map covers {map_nodes} nodes but the skeleton has {graph_nodes}")]
    MismatchedSectionMap { map_nodes: usize, graph_nodes: usize },

    #[error("Synapse table is empty; nothing to snap")]
    EmptyPointCloudError,

    #[error("Skeleton has no nodes")]
    EmptySkeleton,

    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    #[error("Invalid synapse data: {0}")]
    InvalidSynapse(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Gave up after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
