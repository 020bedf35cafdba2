//! # Data Model
//!
//! Plain data that crosses every stage boundary: skeleton rows, built
//! nodes, synapse rows and records.
//!
//! Design rule: no graph algorithms and no spatial index here.
//! This module is pure data: no I/O, no state, no async.

pub mod node;
pub mod synapse;

pub use node::{Node, NodeId, Point3, SkeletonNode};
pub use synapse::{Resolution, SynapseId, SynapseRecord, SynapseRow};

/// Identifier of a neuron (segmentation root id) in the external sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NeuronId(pub u64);

impl std::fmt::Display for NeuronId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
