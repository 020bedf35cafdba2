//! In-memory source.
//!
//! Reference implementation of `SkeletonSource` and `SynapseSource`,
//! backed by maps behind `RwLock`s. `fail_next` scripts transient
//! failures so retry behaviour can be exercised without a network.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashMap;
use parking_lot::RwLock;

use super::{SkeletonSource, SynapseSource};
use crate::model::{NeuronId, SkeletonNode, SynapseRow};
use crate::{Error, Result};

#[derive(Clone, Default)]
pub struct MemorySource {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    skeletons: RwLock<HashMap<NeuronId, Vec<SkeletonNode>>>,
    synapses: RwLock<HashMap<NeuronId, Vec<SynapseRow>>>,
    /// Transient failures still to hand out, across both fetch kinds.
    pending_failures: AtomicUsize,
    fetches: AtomicU64,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_skeleton(&self, neuron: NeuronId, rows: Vec<SkeletonNode>) {
        self.inner.skeletons.write().insert(neuron, rows);
    }

    pub fn insert_synapses(&self, neuron: NeuronId, rows: Vec<SynapseRow>) {
        self.inner.synapses.write().insert(neuron, rows);
    }

    /// Make the next `n` fetches fail with a transient `Source` error.
    pub fn fail_next(&self, n: usize) {
        self.inner.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Fetch calls served so far, failed ones included.
    pub fn fetch_count(&self) -> u64 {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    fn begin_fetch(&self, what: &str, neuron: NeuronId) -> Result<()> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .inner
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(Error::Source(format!("{what} for neuron {neuron} timed out")));
        }
        Ok(())
    }
}

#[async_trait]
impl SkeletonSource for MemorySource {
    async fn fetch_skeleton(&self, neuron: NeuronId) -> Result<Vec<SkeletonNode>> {
        self.begin_fetch("skeleton", neuron)?;
        self.inner
            .skeletons
            .read()
            .get(&neuron)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("skeleton for neuron {neuron}")))
    }
}

#[async_trait]
impl SynapseSource for MemorySource {
    async fn fetch_synapses(&self, neuron: NeuronId) -> Result<Vec<SynapseRow>> {
        self.begin_fetch("synapse table", neuron)?;
        self.inner
            .synapses
            .read()
            .get(&neuron)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("synapses for neuron {neuron}")))
    }
}
