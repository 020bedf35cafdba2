//! # Section Pagination
//!
//! Groups annotated synapses into fixed-size pages, section by section in
//! rank order. Each section gets one trailing empty page where missed
//! synapses are marked by hand.

use serde::Serialize;

use crate::model::{SynapseId, SynapseRecord};
use crate::{Error, Result};

/// One annotation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Global 0-based page number.
    pub number: usize,
    /// Section rank.
    pub section: usize,
    /// Page number within the section.
    pub index_in_section: usize,
    pub synapses: Vec<SynapseId>,
    /// The reserved empty page at the end of a section.
    pub reserved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    pub page_size: usize,
    pub pages: Vec<Page>,
}

impl PageLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, number: usize) -> Option<&Page> {
        self.pages.get(number)
    }

    pub fn pages_for_section(&self, section: usize) -> impl Iterator<Item = &Page> + '_ {
        self.pages.iter().filter(move |p| p.section == section)
    }

    /// Page holding `synapse`, if any.
    pub fn locate(&self, synapse: SynapseId) -> Option<&Page> {
        self.pages.iter().find(|p| p.synapses.contains(&synapse))
    }
}

/// Pages needed by one section holding `synapses` cards, including the
/// reserved page.
pub fn section_page_count(synapses: usize, page_size: usize) -> usize {
    synapses.div_ceil(page_size.max(1)) + 1
}

pub struct PageAssigner {
    page_size: usize,
}

impl PageAssigner {
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".into()));
        }
        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Lay out `records` over `section_count` sections.
    ///
    /// Within a section, cards are ordered by order-within-section, then
    /// by synapse id. Every record must already be assigned.
    pub fn assign(&self, records: &[SynapseRecord], section_count: usize) -> Result<PageLayout> {
        let mut by_section: Vec<Vec<(usize, SynapseId)>> = vec![Vec::new(); section_count];
        for rec in records {
            let (Some(section), Some(order)) = (rec.section, rec.order) else {
                return Err(Error::InvalidSynapse(format!("unassigned synapse {}", rec.id)));
            };
            let bucket = by_section.get_mut(section).ok_or_else(|| {
                Error::InvalidSynapse(format!(
                    "synapse {} assigned to section {section} of {section_count}",
                    rec.id
                ))
            })?;
            bucket.push((order, rec.id));
        }

        let mut pages = Vec::new();
        for (section, mut cards) in by_section.into_iter().enumerate() {
            cards.sort_unstable();
            let mut index_in_section = 0;
            for chunk in cards.chunks(self.page_size) {
                pages.push(Page {
                    number: pages.len(),
                    section,
                    index_in_section,
                    synapses: chunk.iter().map(|(_, id)| *id).collect(),
                    reserved: false,
                });
                index_in_section += 1;
            }
            pages.push(Page {
                number: pages.len(),
                section,
                index_in_section,
                synapses: Vec::new(),
                reserved: true,
            });
        }

        tracing::debug!(pages = pages.len(), sections = section_count, "laid out pages");
        Ok(PageLayout { page_size: self.page_size, pages })
    }
}
