//! End-to-end tests for loading a neuron through the source traits.
//!
//! Each test exercises: fetch (with retry) -> graph -> partition -> annotate.

use neuron_sections::{
    Error, MemorySource, NeuronId, PipelineConfig, SectionPipeline, SectionTarget, SkeletonNode,
    SynapseRow,
};

// ============================================================================
// Helper: a source holding one small forked neuron.
// ============================================================================

fn seeded_source(neuron: NeuronId) -> MemorySource {
    let src = MemorySource::new();
    src.insert_skeleton(
        neuron,
        vec![
            SkeletonNode::new(0, [0.0, 0.0, 0.0], None).soma(),
            SkeletonNode::new(1, [1.0, 0.0, 0.0], Some(0)),
            SkeletonNode::new(2, [2.0, 0.0, 0.0], Some(1)),
            SkeletonNode::new(3, [3.0, 1.0, 0.0], Some(2)),
            SkeletonNode::new(4, [3.0, -1.0, 0.0], Some(2)),
        ],
    );
    src.insert_synapses(
        neuron,
        vec![
            SynapseRow::new(10, [0.1, 0.0, 0.0]),
            SynapseRow::new(11, [3.0, 1.2, 0.0]),
            SynapseRow::new(12, [3.0, 1.2, 0.0]),
        ],
    );
    src
}

fn pipeline() -> SectionPipeline {
    SectionPipeline::new(PipelineConfig::default().with_section_target(SectionTarget::Fixed(2)))
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_load_neuron() {
    let neuron = NeuronId(864691135);
    let src = seeded_source(neuron);
    let loaded = pipeline().load_neuron(&src, &src, neuron).await.unwrap();

    assert_eq!(loaded.neuron, neuron);
    assert_eq!(loaded.graph.node_count(), 5);
    assert_eq!(loaded.map.traversal().root().0, 0);
    // [0, 1] and [2, 3, 4]: already at the target of two.
    assert_eq!(loaded.map.section_count(), 2);
    assert_eq!(loaded.table.assigned_count(), 3);
    // Rank 0 holds synapse 10, rank 1 holds 11 and 12; plus two reserved pages.
    assert_eq!(loaded.layout.page_count(), 4);
    assert_eq!(src.fetch_count(), 2);
}

#[tokio::test]
async fn test_transient_failure_is_retried_once() {
    let neuron = NeuronId(1);
    let src = seeded_source(neuron);
    src.fail_next(1);

    let loaded = pipeline().load_neuron(&src, &src, neuron).await.unwrap();
    assert_eq!(loaded.table.len(), 3);
    // Failed skeleton fetch, its retry, then the synapse fetch.
    assert_eq!(src.fetch_count(), 3);
}

#[tokio::test]
async fn test_second_failure_is_terminal() {
    let neuron = NeuronId(1);
    let src = seeded_source(neuron);
    src.fail_next(2);

    let err = pipeline().load_neuron(&src, &src, neuron).await.unwrap_err();
    assert!(matches!(err, Error::RetriesExhausted { attempts: 2, .. }));
    assert_eq!(src.fetch_count(), 2);
}

#[tokio::test]
async fn test_missing_neuron_is_not_retried() {
    let src = seeded_source(NeuronId(1));
    let err = pipeline().load_neuron(&src, &src, NeuronId(2)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(src.fetch_count(), 1);
}

#[tokio::test]
async fn test_empty_synapse_table_surfaces() {
    let neuron = NeuronId(5);
    let src = seeded_source(neuron);
    src.insert_synapses(neuron, Vec::new());
    let err = pipeline().load_neuron(&src, &src, neuron).await.unwrap_err();
    assert!(matches!(err, Error::EmptyPointCloudError));
}
