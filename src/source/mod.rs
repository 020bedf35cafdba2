//! # Input Sources
//!
//! The contract between the pipeline and whatever materialises skeletons
//! and synapse tables (a mesh/skeleton service, a materialization database,
//! files). The pipeline itself never does I/O; it only consumes what a
//! source returns.
//!
//! ## Implementations
//!
//! | Source | Module | Description |
//! |--------|--------|-------------|
//! | `MemorySource` | `memory` | In-process maps for testing/embedding |
//!
//! Fetches are retried once on a `Source` error. A second failure ends in
//! `RetriesExhausted`; every other error is returned as-is.

pub mod memory;

use std::future::Future;

use async_trait::async_trait;

use crate::model::{NeuronId, SkeletonNode, SynapseRow};
use crate::{Error, Result};

pub use memory::MemorySource;

/// Total attempts for one fetch (the first try plus one retry).
pub const MAX_FETCH_ATTEMPTS: u32 = 2;

/// Supplies a neuron's skeleton rows.
#[async_trait]
pub trait SkeletonSource: Send + Sync {
    async fn fetch_skeleton(&self, neuron: NeuronId) -> Result<Vec<SkeletonNode>>;
}

/// Supplies a neuron's synapse rows.
#[async_trait]
pub trait SynapseSource: Send + Sync {
    async fn fetch_synapses(&self, neuron: NeuronId) -> Result<Vec<SynapseRow>>;
}

/// Run `attempt` up to `MAX_FETCH_ATTEMPTS` times while it fails with
/// `Error::Source`.
pub async fn fetch_with_retry<T, F, Fut>(what: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last = String::new();
    for n in 1..=MAX_FETCH_ATTEMPTS {
        match attempt().await {
            Ok(v) => return Ok(v),
            Err(Error::Source(msg)) => {
                tracing::warn!(what, attempt = n, error = %msg, "fetch failed");
                last = msg;
            }
            Err(e) => return Err(e),
        }
    }
    Err(Error::RetriesExhausted {
        attempts: MAX_FETCH_ATTEMPTS,
        message: format!("{what}: {last}"),
    })
}
