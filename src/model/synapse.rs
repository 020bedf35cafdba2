//! Synapse observations and the per-axis resolution they are measured in.

use serde::{Deserialize, Serialize};

use super::{NodeId, Point3};
use crate::{Error, Result};

/// Synapse row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SynapseId(pub u64);

impl std::fmt::Display for SynapseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-axis multiplier from synapse-table units to skeleton units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0, z: 1.0 }
    }
}

impl Resolution {
    /// Build a resolution, rejecting non-finite or non-positive factors.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        let r = Self { x, y, z };
        r.validate()?;
        Ok(r)
    }

    pub fn validate(&self) -> Result<()> {
        for (axis, v) in [("x", self.x), ("y", self.y), ("z", self.z)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::InvalidResolution(format!(
                    "{axis} factor must be finite and positive, got {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn apply(&self, p: Point3) -> Point3 {
        Point3::new(p.x * self.x, p.y * self.y, p.z * self.z)
    }
}

/// Raw synapse input: identifier and coordinate in table units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynapseRow {
    pub id: SynapseId,
    pub position: Point3,
}

impl SynapseRow {
    pub fn new(id: u64, position: impl Into<Point3>) -> Self {
        Self { id: SynapseId(id), position: position.into() }
    }
}

/// A synapse plus the assignment attached by the snapping step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseRecord {
    pub id: SynapseId,
    pub position: Point3,
    pub nearest_node: Option<NodeId>,
    /// Section rank (left-to-right position), not the raw segment index.
    pub section: Option<usize>,
    pub order: Option<usize>,
}

impl SynapseRecord {
    pub fn from_row(row: SynapseRow) -> Result<Self> {
        if !row.position.is_finite() {
            return Err(Error::InvalidCoordinate(format!(
                "synapse {} has non-finite coordinate {:?}",
                row.id, row.position
            )));
        }
        Ok(Self {
            id: row.id,
            position: row.position,
            nearest_node: None,
            section: None,
            order: None,
        })
    }

    pub fn is_assigned(&self) -> bool {
        self.nearest_node.is_some() && self.section.is_some() && self.order.is_some()
    }
}
