//! Pipeline configuration.
//!
//! Everything has a default; `PipelineConfig::from_json` accepts partial
//! documents and fills the rest.

use serde::{Deserialize, Serialize};

use crate::model::Resolution;
use crate::{Error, Result};

/// Cards per annotation page.
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Branch points per section in the derived target.
pub const DEFAULT_BRANCH_POINTS_PER_SECTION: usize = 4;

/// How many sections the merger should aim for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SectionTarget {
    /// Exactly this many sections (or fewer if there are fewer segments).
    Fixed(usize),
    /// ⌊branch points / k⌋, at least one.
    PerBranchPoints(usize),
}

impl Default for SectionTarget {
    fn default() -> Self {
        SectionTarget::PerBranchPoints(DEFAULT_BRANCH_POINTS_PER_SECTION)
    }
}

impl SectionTarget {
    /// Resolve the target for a skeleton with `branch_points` junctions.
    pub fn resolve(&self, branch_points: usize) -> usize {
        match *self {
            SectionTarget::Fixed(n) => n.max(1),
            SectionTarget::PerBranchPoints(k) => (branch_points / k.max(1)).max(1),
        }
    }
}

/// PageRank parameters for root selection when no soma is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self { damping: 0.85, max_iterations: 100, tolerance: 1e-6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub section_target: SectionTarget,
    pub page_size: usize,
    /// Synapse-table units → skeleton units.
    pub resolution: Resolution,
    pub pagerank: PageRankConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            section_target: SectionTarget::default(),
            page_size: DEFAULT_PAGE_SIZE,
            resolution: Resolution::default(),
            pagerank: PageRankConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_section_target(mut self, target: SectionTarget) -> Self {
        self.section_target = target;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".into()));
        }
        match self.section_target {
            SectionTarget::Fixed(0) => {
                return Err(Error::Config("fixed section target must be at least 1".into()));
            }
            SectionTarget::PerBranchPoints(0) => {
                return Err(Error::Config("branch points per section must be at least 1".into()));
            }
            _ => {}
        }
        self.resolution.validate()?;
        let pr = &self.pagerank;
        if !(pr.damping > 0.0 && pr.damping < 1.0) {
            return Err(Error::Config(format!(
                "pagerank damping must be in (0, 1), got {}",
                pr.damping
            )));
        }
        if pr.max_iterations == 0 || !(pr.tolerance > 0.0) {
            return Err(Error::Config(
                "pagerank needs max_iterations ≥ 1 and tolerance > 0".into(),
            ));
        }
        Ok(())
    }
}
