//! Skeleton node and 3D point types.

use serde::{Deserialize, Serialize};

/// Skeleton node identifier (the SWC-style sample id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in skeleton coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Squared Euclidean distance.
    pub fn distance_2(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// One row of skeleton input: a sample with an optional parent sample.
///
/// Parent links are collapsed into undirected adjacency when the
/// `SkeletonGraph` is built; the direction carries no meaning afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub id: NodeId,
    pub position: Point3,
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub is_soma: bool,
}

impl SkeletonNode {
    pub fn new(id: u64, position: impl Into<Point3>, parent: Option<u64>) -> Self {
        Self {
            id: NodeId(id),
            position: position.into(),
            parent: parent.map(NodeId),
            is_soma: false,
        }
    }

    pub fn soma(mut self) -> Self {
        self.is_soma = true;
        self
    }
}

/// A node as stored in the built graph: position plus derived degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point3,
    pub degree: usize,
    pub is_soma: bool,
}
