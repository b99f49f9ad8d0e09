//! Atlas aggregate - owns all pages and groups regions under them
//!
//! Pages live in a stably-indexed table; a [`PageId`] is an index into
//! it. The visible page sequence holds only pages that have at least
//! one region, in the order each received its first region. Regions
//! are kept per page in the order they were added.

use thiserror::Error;

use crate::models::{Page, PageId, Region};

/// Error when resolving a page reference against the atlas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasError {
    /// The handle does not point at any page in the table
    #[error("page reference {index} does not resolve to any page")]
    UnresolvedPage { index: usize },
}

/// The complete parsed structure: all pages and their regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atlas {
    pages: Vec<Page>,
    order: Vec<PageId>,
    groups: Vec<Vec<Region>>,
}

impl Atlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an atlas by inserting every page, then adding every region
    /// in sequence.
    pub fn from_regions(pages: Vec<Page>, regions: Vec<Region>) -> Result<Self, AtlasError> {
        let mut atlas = Atlas::new();
        for page in pages {
            atlas.insert_page(page);
        }
        for region in regions {
            atlas.add_region(region)?;
        }
        Ok(atlas)
    }

    /// Take ownership of a page and return its handle.
    ///
    /// The page does not enter the visible page sequence until its
    /// first region is added.
    pub fn insert_page(&mut self, page: Page) -> PageId {
        let id = PageId::new(self.pages.len());
        self.pages.push(page);
        self.groups.push(Vec::new());
        id
    }

    /// Resolve a page handle.
    pub fn page(&self, id: PageId) -> Result<&Page, AtlasError> {
        self.pages.get(id.index()).ok_or(AtlasError::UnresolvedPage { index: id.index() })
    }

    /// Resolve a page handle for mutation.
    pub fn page_mut(&mut self, id: PageId) -> Result<&mut Page, AtlasError> {
        self.pages.get_mut(id.index()).ok_or(AtlasError::UnresolvedPage { index: id.index() })
    }

    /// Add a region under its page.
    ///
    /// Fails if the region's page handle does not resolve, leaving the
    /// atlas unchanged. The page enters the visible sequence on its
    /// first region and is never duplicated.
    pub fn add_region(&mut self, region: Region) -> Result<(), AtlasError> {
        let id = region.page();
        if id.index() >= self.pages.len() {
            return Err(AtlasError::UnresolvedPage { index: id.index() });
        }
        if self.groups[id.index()].is_empty() {
            self.order.push(id);
        }
        self.groups[id.index()].push(region);
        Ok(())
    }

    /// Pages that have regions, in first-seen order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> + '_ {
        self.order.iter().map(move |id| &self.pages[id.index()])
    }

    /// Number of visible pages.
    pub fn page_count(&self) -> usize {
        self.order.len()
    }

    /// Regions of one page, in the order they were added.
    pub fn regions_of(&self, id: PageId) -> Result<&[Region], AtlasError> {
        self.groups
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or(AtlasError::UnresolvedPage { index: id.index() })
    }

    /// All regions, grouped by page in first-seen page order and in
    /// added order within a page. Restartable: each call starts over.
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.order.iter().flat_map(move |id| self.groups[id.index()].iter())
    }

    /// Total number of regions.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    /// The most recently added region of a page, for in-place mutation
    /// while its field lines are still being read.
    pub(crate) fn last_region_mut(&mut self, id: PageId) -> Option<&mut Region> {
        self.groups.get_mut(id.index()).and_then(|group| group.last_mut())
    }
}
