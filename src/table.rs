//! Synapse table and its shared, lock-guarded form.
//!
//! The table is an explicit object passed by reference. When several
//! request handlers share one, `SharedSynapseTable` holds a single write
//! lock for the whole read-modify-write that attaches section columns.

use std::sync::Arc;

use hashbrown::HashSet;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;

use crate::model::{SynapseId, SynapseRecord, SynapseRow};
use crate::{Error, Result};

/// Owned synapse records for one neuron.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SynapseTable {
    records: Vec<SynapseRecord>,
}

impl SynapseTable {
    /// Validate rows and build the table. Duplicate ids are rejected;
    /// coincident coordinates are fine.
    pub fn from_rows(rows: impl IntoIterator<Item = SynapseRow>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for row in rows {
            if !seen.insert(row.id) {
                return Err(Error::InvalidSynapse(format!("duplicate synapse id {}", row.id)));
            }
            records.push(SynapseRecord::from_row(row)?);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SynapseRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [SynapseRecord] {
        &mut self.records
    }

    pub fn get(&self, id: SynapseId) -> Option<&SynapseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Number of records whose assignment is complete.
    pub fn assigned_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_assigned()).count()
    }

    /// Records in section `section`, ordered by (order, id).
    pub fn section_records(&self, section: usize) -> Vec<&SynapseRecord> {
        let mut out: Vec<&SynapseRecord> =
            self.records.iter().filter(|r| r.section == Some(section)).collect();
        out.sort_by_key(|r| (r.order, r.id));
        out
    }
}

/// Cloneable handle to a table shared between callers.
#[derive(Debug, Clone, Default)]
pub struct SharedSynapseTable {
    inner: Arc<RwLock<SynapseTable>>,
}

impl SharedSynapseTable {
    pub fn new(table: SynapseTable) -> Self {
        Self { inner: Arc::new(RwLock::new(table)) }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, SynapseTable> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, SynapseTable> {
        self.inner.write()
    }

    /// Run `f` with the write lock held for its whole duration.
    pub fn update<T>(&self, f: impl FnOnce(&mut SynapseTable) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Replace the table contents, e.g. after a reload.
    pub fn replace(&self, table: SynapseTable) {
        *self.inner.write() = table;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let t = SynapseTable::from_rows(vec![
            SynapseRow::new(1, [0.0, 0.0, 0.0]),
            SynapseRow::new(2, [0.0, 0.0, 0.0]),
        ])
        .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.assigned_count(), 0);
        assert!(t.get(SynapseId(2)).is_some());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = SynapseTable::from_rows(vec![
            SynapseRow::new(1, [0.0, 0.0, 0.0]),
            SynapseRow::new(1, [1.0, 0.0, 0.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSynapse(_)));
    }

    #[test]
    fn test_shared_update_is_visible() {
        let shared = SharedSynapseTable::new(
            SynapseTable::from_rows(vec![SynapseRow::new(1, [0.0, 0.0, 0.0])]).unwrap(),
        );
        let other = shared.clone();
        shared
            .update(|t| {
                t.records_mut()[0].section = Some(3);
                Ok(())
            })
            .unwrap();
        assert_eq!(other.read().records()[0].section, Some(3));
    }

    #[test]
    fn test_shared_replace() {
        let shared = SharedSynapseTable::default();
        let other = shared.clone();
        assert!(other.read().is_empty());

        let reloaded = SynapseTable::from_rows(vec![
            SynapseRow::new(4, [1.0, 0.0, 0.0]),
            SynapseRow::new(5, [2.0, 0.0, 0.0]),
        ])
        .unwrap();
        shared.replace(reloaded.clone());
        assert_eq!(*other.read(), reloaded);
    }
}
